//! Canonical schema constants for structured logging and events
//!
//! These constants keep the field names of every backup report consistent.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_TICK_ID: &str = "tick_id";

// Backup entities
pub const FIELD_ARTIFACT: &str = "artifact";
pub const FIELD_DESCRIPTOR: &str = "descriptor";
pub const FIELD_BACKUP_DIR: &str = "backup_dir";
pub const FIELD_SIZE_BYTES: &str = "size_bytes";

// Retention counters
pub const FIELD_KEEP_COUNT: &str = "keep_count";
pub const FIELD_DELETED: &str = "deleted";
pub const FIELD_RETAINED: &str = "retained";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
