//! Configuration management
//!
//! Handler settings, read from a JSON file or built in code.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::common::{AppResult, Error};

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/presentations",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/spreadsheets",
];

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_secrets_path() -> PathBuf {
    PathBuf::from("secrets.json")
}

fn default_requests_per_minute() -> usize {
    60
}

fn default_max_batch_size() -> usize {
    60
}

fn default_auth_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerConfig {
    /// Drive folder that receives copied templates.
    #[serde(default)]
    pub target_folder_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Persisted OAuth token artifact.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
    /// OAuth client secrets, only read when the interactive flow runs.
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: usize,
    /// Edits per `batchUpdate` call before the request is split.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
}

impl HandlerConfig {
    pub fn new(target_folder_id: impl Into<String>) -> Self {
        Self {
            target_folder_id: target_folder_id.into(),
            scopes: default_scopes(),
            token_path: default_token_path(),
            secrets_path: default_secrets_path(),
            requests_per_minute: default_requests_per_minute(),
            max_batch_size: default_max_batch_size(),
            auth_timeout_secs: default_auth_timeout_secs(),
        }
    }

    /// Load a JSON config file and check its limits.
    ///
    /// The folder id may still be missing; it can come from elsewhere.
    pub fn load(path: &Path) -> AppResult<Self> {
        debug!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config {:?}: {}", path, e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {:?}: {}", path, e)))?;
        config.validate_limits()?;
        Ok(config)
    }

    /// Full check, needed before any Drive or Slides call.
    pub fn validate(&self) -> AppResult<()> {
        if self.target_folder_id.trim().is_empty() {
            return Err(Error::Config("target_folder_id is required".to_string()));
        }
        self.validate_limits()
    }

    /// Everything except the folder id, which only the façade needs.
    pub fn validate_limits(&self) -> AppResult<()> {
        if self.scopes.is_empty() {
            return Err(Error::Config("At least one scope is required".to_string()));
        }
        if self.requests_per_minute == 0 || self.max_batch_size == 0 {
            return Err(Error::Config(
                "requests_per_minute and max_batch_size must be positive".to_string(),
            ));
        }
        // A batch is admitted whole, so it must fit in one window.
        if self.max_batch_size > self.requests_per_minute {
            return Err(Error::Config(format!(
                "max_batch_size ({}) must not exceed requests_per_minute ({})",
                self.max_batch_size, self.requests_per_minute
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"target_folder_id": "folder123"}}"#).unwrap();

        let config = HandlerConfig::load(file.path()).unwrap();
        assert_eq!(config, HandlerConfig::new("folder123"));
        assert_eq!(config.scopes.len(), 3);
        assert_eq!(config.token_path, PathBuf::from("token.json"));
    }

    #[test]
    fn test_load_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"target_folder_id": "f", "max_batch_size": 20, "token_path": "/tmp/t.json"}}"#
        )
        .unwrap();

        let config = HandlerConfig::load(file.path()).unwrap();
        assert_eq!(config.max_batch_size, 20);
        assert_eq!(config.requests_per_minute, 60);
        assert_eq!(config.token_path, PathBuf::from("/tmp/t.json"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(HandlerConfig::new("  ").validate().is_err());

        let mut config = HandlerConfig::new("folder");
        config.requests_per_minute = 0;
        assert!(config.validate().is_err());

        let mut config = HandlerConfig::new("folder");
        config.scopes.clear();
        assert!(config.validate().is_err());

        let mut config = HandlerConfig::new("folder");
        config.requests_per_minute = 30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_batch_size (60)"));

        config.max_batch_size = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_allows_missing_folder() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token_path": "/tmp/t.json"}}"#).unwrap();

        let config = HandlerConfig::load(file.path()).unwrap();
        assert!(config.validate_limits().is_ok());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_oversized_batches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"target_folder_id": "f", "requests_per_minute": 30}}"#
        )
        .unwrap();

        let err = HandlerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HandlerConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
