//! Client configuration with provenance.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use testrun_server::{RouteError, RouteParams};

use super::merge::merge_layers;

/// Repo config location, relative to the working directory.
pub const REPO_CONFIG_PATH: &str = ".testrun/config.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Repo,
    Cli,
}

/// A layer that contributed to the loaded config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Settings for the `testrun` CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub organization: Option<String>,
    pub project: Option<String>,
    pub job: Option<String>,
    /// Catalog document served by the in-process handler.
    pub catalog: Option<PathBuf>,
    /// Environment id or slug to select instead of the first one.
    pub environment: Option<String>,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            job: None,
            catalog: None,
            environment: None,
            log_level: "warn".to_string(),
        }
    }
}

/// Merged config and the layers it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ClientConfig,
    pub sources: Vec<ConfigSource>,
}

impl ClientConfig {
    /// Merge the built-in defaults, the optional user and repo files, and
    /// CLI overrides. Missing files are skipped.
    pub fn build(
        user_path: Option<&Path>,
        repo_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<LoadedConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push(defaults_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
        });

        for (origin, path) in [(ConfigOrigin::User, user_path), (ConfigOrigin::Repo, repo_path)] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            layers.push(load_toml_file(path)?);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_path_buf()),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
            });
        }

        let merged = merge_layers(layers);
        let config: ClientConfig =
            serde_json::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(LoadedConfig { config, sources })
    }

    /// Route params for the configured job.
    pub fn route(&self) -> Result<RouteParams, ConfigError> {
        let organization = self.organization.as_deref().ok_or(ConfigError::Missing("organization"))?;
        let project = self.project.as_deref().ok_or(ConfigError::Missing("project"))?;
        let job = self.job.as_deref().ok_or(ConfigError::Missing("job"))?;
        Ok(RouteParams::new(organization, project, job)?)
    }

    pub fn catalog_path(&self) -> Result<&Path, ConfigError> {
        self.catalog.as_deref().ok_or(ConfigError::Missing("catalog"))
    }
}

/// User config location, if a home directory is known.
pub fn default_user_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/testrun/config.toml"))
}

fn defaults_value() -> Value {
    serde_json::json!({ "log_level": ClientConfig::default().log_level })
}

fn load_toml_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
