//! Page data model.
//!
//! Snapshots loaded once per page view. Nothing here is mutated by the
//! authoring pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of execution environment, used for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentKind {
    Development,
    Staging,
    Production,
    Preview,
}

impl std::fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentKind::Development => write!(f, "dev"),
            EnvironmentKind::Staging => write!(f, "staging"),
            EnvironmentKind::Production => write!(f, "prod"),
            EnvironmentKind::Preview => write!(f, "preview"),
        }
    }
}

/// A named execution target with the job version deployed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    /// Job version deployed to this environment.
    pub version_id: String,
    /// Whether submissions must name the account the run acts for.
    #[serde(default)]
    pub has_auth_resolver: bool,
    pub slug: String,
    pub kind: EnvironmentKind,
}

/// A developer-authored sample payload for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePayload {
    pub id: String,
    pub name: String,
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A previously submitted payload kept for reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRun {
    pub id: String,
    pub number: u64,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// A run created by the run-creation service. Only the id is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
}

/// Read-only view model returned for a page load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPageData {
    pub environments: Vec<Environment>,
    pub runs: Vec<RecentRun>,
    pub examples: Vec<ExamplePayload>,
}

impl TestPageData {
    /// Find an environment by id.
    pub fn environment(&self, id: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.id == id)
    }

    /// Find an environment by id or slug.
    pub fn find_environment(&self, key: &str) -> Option<&Environment> {
        self.environment(key)
            .or_else(|| self.environments.iter().find(|env| env.slug == key))
    }
}
