//! Calendar scheduling for backup ticks.

pub mod cron;

pub use cron::{CronExpr, CronField, CronParseError};

/// Once a year, 2 January at 03:00:00 local time.
pub const ANNUAL_BACKUP: &str = "0 0 3 2 1 ?";

/// Every second. Useful for smoke-testing a deployment.
pub const EVERY_SECOND: &str = "* * * * * *";
