//! Outbound field composition.

use testrun_protocol::{Environment, SubmitFields};

/// Build the fields posted for a submit attempt.
///
/// The payload is passed through verbatim; parsing happens on validation.
/// `version_id` is empty if the environment id is not in the set. An unset or
/// empty account id leaves the `accountId` key out entirely.
pub fn compose(
    current_text: &str,
    selected_environment_id: &str,
    environments: &[Environment],
    account_id: Option<&str>,
) -> SubmitFields {
    let version_id = environments
        .iter()
        .find(|env| env.id == selected_environment_id)
        .map(|env| env.version_id.clone())
        .unwrap_or_default();

    SubmitFields {
        payload: current_text.to_string(),
        environment_id: selected_environment_id.to_string(),
        version_id,
        account_id: account_id.filter(|a| !a.is_empty()).map(str::to_string),
    }
}
