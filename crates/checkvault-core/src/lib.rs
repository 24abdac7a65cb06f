//! checkvault core - domain rules for the scheduled backup job
//!
//! This crate holds everything about a backup that does not touch the store
//! or the filesystem:
//! - Error facility (`ExError`) with the backup failure taxonomy
//! - Structured logging facility and boundary macros
//! - Configuration loading and validation
//! - Calendar expressions deciding when a tick fires
//! - Artifact naming and provenance descriptor content
//! - Retention policy and the pure deletion-selection rule
//! - Clock abstraction for deterministic tests

pub mod clock;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod retention;
pub mod schedule;

// Used by the logging macros through `$crate::schema`
pub use checkvault_core_types::schema;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CheckvaultConfig;
pub use errors::{ExError, ExErrorKind, Result};
pub use model::{ArtifactName, BackupArtifact, ProvenanceRecord, StoreIdentity, TriggerKind};
pub use retention::{select_for_deletion, ArtifactEntry, RetentionPolicy};
pub use schedule::CronExpr;
