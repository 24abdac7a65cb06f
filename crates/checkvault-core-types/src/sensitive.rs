//! Redacting wrapper for store credentials
//!
//! The store password travels from configuration into the snapshot connector.
//! Wrapped in `Sensitive`, it never reaches logs, tick reports, or
//! provenance descriptors.

use serde::{Deserialize, Deserializer};
use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// A value that formats as `***REDACTED***` under both `{:?}` and `{}`
///
/// ```
/// use checkvault_core_types::Sensitive;
///
/// let password = Sensitive::new(String::from("hunter2"));
/// assert_eq!(format!("{:?}", password), "***REDACTED***");
/// assert_eq!(password.expose(), "hunter2");
/// ```
#[derive(Clone)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// The raw value; only the store connector should need it
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

// No Serialize: a secret read from configuration is never written back out.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_never_formats() {
        let password = Sensitive::new("db-password");
        for rendered in [format!("{:?}", password), format!("{}", password)] {
            assert_eq!(rendered, REDACTED);
            assert!(!rendered.contains("db-password"));
        }
    }

    #[test]
    fn test_expose_and_into_inner() {
        let password = Sensitive::new(String::from("test"));
        assert_eq!(password.clone().expose(), "test");
        assert_eq!(password.into_inner(), "test");
    }

    #[test]
    fn test_deserialized_from_config_value() {
        let password: Sensitive<String> = serde_json::from_str("\"hunter2\"").unwrap();
        assert_eq!(password.expose(), "hunter2");
        assert_eq!(password.to_string(), REDACTED);
    }

    #[test]
    fn test_store_settings_debug_hides_password() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct StoreSettings {
            url: String,
            principal: String,
            password: Option<Sensitive<String>>,
        }

        let settings = StoreSettings {
            url: "sqlite:records.db".to_string(),
            principal: "sa".to_string(),
            password: Some(Sensitive::new("secret123".to_string())),
        };

        let rendered = format!("{:?}", settings);
        assert!(rendered.contains("records.db"));
        assert!(rendered.contains(REDACTED));
        assert!(!rendered.contains("secret123"));
    }
}
