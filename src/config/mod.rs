//! Layered client configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config (~/.config/testrun/config.toml)
//! 3. Repo config (.testrun/config.toml)
//! 4. CLI flags

mod client;
mod merge;

pub use client::{
    default_user_path, ClientConfig, ConfigError, ConfigOrigin, ConfigSource, LoadedConfig,
    REPO_CONFIG_PATH,
};
pub use merge::{deep_merge, merge_layers};
