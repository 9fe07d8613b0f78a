//! Submit fields and the validated submission command.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Form field names.
pub mod names {
    pub const PAYLOAD: &str = "payload";
    pub const ENVIRONMENT_ID: &str = "environmentId";
    pub const VERSION_ID: &str = "versionId";
    pub const ACCOUNT_ID: &str = "accountId";
}

/// Outbound fields posted when the user starts a test run.
///
/// `account_id` is absent (not empty) when it does not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFields {
    /// Raw editor text, not yet parsed.
    pub payload: String,
    pub environment_id: String,
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl SubmitFields {
    /// Flatten into the string-keyed form consumed by [`crate::validate`].
    pub fn to_form(&self) -> BTreeMap<String, String> {
        let mut form = BTreeMap::new();
        form.insert(names::PAYLOAD.to_string(), self.payload.clone());
        form.insert(names::ENVIRONMENT_ID.to_string(), self.environment_id.clone());
        form.insert(names::VERSION_ID.to_string(), self.version_id.clone());
        if let Some(ref account_id) = self.account_id {
            form.insert(names::ACCOUNT_ID.to_string(), account_id.clone());
        }
        form
    }
}

/// A validated submission, ready for the run-creation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCommand {
    /// Parsed payload; any JSON type is accepted.
    pub payload: serde_json::Value,
    pub environment_id: String,
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}
