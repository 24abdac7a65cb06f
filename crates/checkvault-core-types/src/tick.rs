//! Tick correlation
//!
//! Every run of the backup pipeline gets a `TickId` so that its log lines,
//! its report, and any error it raises can be tied together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single backup tick
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickId(String);

impl TickId {
    /// Generate a new TickId using UUIDv7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for TickId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_id_generation() {
        let id1 = TickId::new();
        let id2 = TickId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_tick_ids_sort_by_creation() {
        let first = TickId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = TickId::new();

        assert!(first.as_str() < second.as_str());
    }

    #[test]
    fn test_tick_id_display() {
        let id = TickId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_serialization() {
        let id = TickId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: TickId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
