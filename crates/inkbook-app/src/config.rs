//! Session configuration.

use inkbook_core::MAX_UNDO_HISTORY;
use inkbook_core::storage::DEFAULT_AUTOSAVE_INTERVAL_SECS;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming the native data directory.
pub const DATA_DIR_ENV: &str = "INKBOOK_DATA_DIR";
/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "INKBOOK_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Page size in pixels.
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub autosave_interval_secs: u64,
    /// Undo states kept per page.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            history_limit: MAX_UNDO_HISTORY,
        }
    }
}

impl SessionConfig {
    /// Parse a config object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("config must be a JSON object"));
        }
        serde_json::from_value(value)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (800, 600));
        assert_eq!(config.autosave_interval(), Duration::from_secs(5));
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{"history_limit": 10}"#).unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.canvas_width, 800);
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        for json in ["[]", "[800, 600]", "42", "null", "\"config\""] {
            let err = SessionConfig::from_json(json).unwrap_err();
            assert!(err.to_string().contains("JSON object"), "{json}: {err}");
        }
        assert!(SessionConfig::from_json("{").is_err());
    }
}
