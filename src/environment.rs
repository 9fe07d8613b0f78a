//! Target environment selection.

use testrun_protocol::Environment;

/// No environments were loaded; the page can only show a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Can't run a test: this job has no environments")]
pub struct EmptyEnvironments;

/// Tried to select an environment that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown environment: {0}")]
pub struct UnknownEnvironment(pub String);

/// Selected environment and the fields derived from it.
///
/// The selected id is always a member of the loaded set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSelection {
    environments: Vec<Environment>,
    selected: usize,
}

impl EnvironmentSelection {
    /// Select the first environment of a non-empty set.
    pub fn new(environments: Vec<Environment>) -> Result<Self, EmptyEnvironments> {
        if environments.is_empty() {
            return Err(EmptyEnvironments);
        }
        Ok(Self {
            environments,
            selected: 0,
        })
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn selected_environment_id(&self) -> &str {
        &self.selected_environment().id
    }

    pub fn selected_environment(&self) -> &Environment {
        &self.environments[self.selected]
    }

    /// Whether the account id input is shown.
    pub fn account_id_field_visible(&self) -> bool {
        self.selected_environment().has_auth_resolver
    }

    /// Switch environments. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> Result<(), UnknownEnvironment> {
        let index = self
            .environments
            .iter()
            .position(|env| env.id == id)
            .ok_or_else(|| UnknownEnvironment(id.to_string()))?;
        self.selected = index;
        Ok(())
    }
}
