// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Keys probed, in order, when looking for a module's default export.
    pub default_keys: Vec<String>,
    pub skip_placeholders: bool,
    pub skip_globals: bool,
    pub log_filter_failures: bool,
    pub store_facility_key: String,
    pub store_enumerator: String,
    pub store_name_method: String,
    pub store_dispatch_token: String,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            default_keys: vec!["default".to_string(), "Z".to_string(), "ZP".to_string()],
            skip_placeholders: true,
            skip_globals: true,
            log_filter_failures: true,
            store_facility_key: "Store".to_string(),
            store_enumerator: "getAll".to_string(),
            store_name_method: "getName".to_string(),
            store_dispatch_token: "_dispatchToken".to_string(),
        }
    }
}

impl FinderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: FinderConfig = serde_json::from_str(&content)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn with_default_keys(mut self, keys: &[&str]) -> Self {
        self.default_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_log_filter_failures(mut self, enabled: bool) -> Self {
        self.log_filter_failures = enabled;
        self
    }

    pub fn with_skip_placeholders(mut self, skip: bool) -> Self {
        self.skip_placeholders = skip;
        self
    }

    pub fn with_store_facility(mut self, key: &str, enumerator: &str) -> Self {
        self.store_facility_key = key.to_string();
        self.store_enumerator = enumerator.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_keys.is_empty() {
            return Err("default_keys must not be empty".to_string());
        }
        if self.default_keys.iter().any(|k| k.is_empty()) {
            return Err("default_keys must not contain empty keys".to_string());
        }
        if self.store_facility_key.is_empty() || self.store_enumerator.is_empty() {
            return Err("store facility key and enumerator must be set".to_string());
        }
        if self.store_name_method.is_empty() {
            return Err("store_name_method must be set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FinderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_keys, vec!["default", "Z", "ZP"]);
    }

    #[test]
    fn test_validate_rejects_empty_default_keys() {
        let config = FinderConfig::new().with_default_keys(&[]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FinderConfig = serde_json::from_str(r#"{"log_filter_failures": false}"#).unwrap();
        assert!(!config.log_filter_failures);
        assert_eq!(config.store_enumerator, "getAll");
    }
}
