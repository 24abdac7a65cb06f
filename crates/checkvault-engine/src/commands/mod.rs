//! Engine-level commands with boundary logging
//!
//! The engine owns lifecycle logging: `log_op_start!` at entry,
//! `log_op_end!` on success, `log_op_error!` on failure. The store and core
//! layers only emit `debug!`/`info!` details underneath.

pub mod backup_tick;
pub mod prune;
