//! checkvault engine - orchestration layer
//!
//! Wires the store-facing pieces into one backup tick and fires ticks on
//! the configured calendar.

pub mod commands;
pub mod job;
pub mod scheduler;

pub use commands::backup_tick::{run_tick, DescriptorStatus, Stage, TickOutcome, TickReport};
pub use commands::prune::prune_backups;
pub use job::BackupJob;
pub use scheduler::{BackupScheduler, TickRunner};
