//! checkvault store - everything that touches the durable store or the disk
//!
//! Provides:
//! - SQLite connection management for the store being backed up
//! - The snapshot executor (`VACUUM INTO` behind a connector trait)
//! - Backup directory listing and the ensure-exists step
//! - The retention manager that prunes artifacts with their descriptors
//! - The provenance recorder that writes descriptor files

pub mod db;
pub mod errors;
pub mod fs;
pub mod provenance;
pub mod retention;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use retention::{RetentionManager, RetentionOutcome};
pub use snapshot::{execute_snapshot, SqliteConnector, StoreConnection, StoreConnector};
