//! Server configuration.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors loading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Server configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Number of recent runs kept per job.
    pub recent_run_limit: usize,
    /// Log level for the stderr subscriber (error, warn, info, debug, trace).
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            recent_run_limit: 10,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.recent_run_limit, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml("recent_run_limit = 3\n").unwrap();
        assert_eq!(config.recent_run_limit, 3);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ServerConfig::from_toml("recent_run_limit = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
