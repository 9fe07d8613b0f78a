//! Submission schema.
//!
//! Turns raw string-keyed form input into a [`SubmissionCommand`] or the full
//! set of field errors. Never panics and never returns early on the first bad
//! field.

use std::collections::BTreeMap;

use serde_json::error::Category;

use crate::error::FieldErrors;
use crate::fields::{names, SubmissionCommand};

/// Message for a missing or empty required field.
pub const REQUIRED_MESSAGE: &str = "Required";

/// Message used when the JSON failure is not a syntax error.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON";

/// Validate and normalize submitted form fields.
pub fn validate(form: &BTreeMap<String, String>) -> Result<SubmissionCommand, FieldErrors> {
    let mut errors = FieldErrors::new();

    let payload = match form.get(names::PAYLOAD) {
        None => {
            errors.add(names::PAYLOAD, REQUIRED_MESSAGE);
            None
        }
        Some(text) => match parse_payload(text) {
            Ok(value) => Some(value),
            Err(message) => {
                errors.add(names::PAYLOAD, message);
                None
            }
        },
    };

    let environment_id = required(form, names::ENVIRONMENT_ID, &mut errors);
    let version_id = required(form, names::VERSION_ID, &mut errors);

    // An empty account id means "not provided".
    let account_id = form
        .get(names::ACCOUNT_ID)
        .filter(|v| !v.is_empty())
        .cloned();

    match (payload, environment_id, version_id) {
        (Some(payload), Some(environment_id), Some(version_id)) if errors.is_empty() => {
            Ok(SubmissionCommand {
                payload,
                environment_id,
                version_id,
                account_id,
            })
        }
        _ => Err(errors),
    }
}

/// Parse payload text as JSON of any shape.
pub fn parse_payload(text: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof => e.to_string(),
        Category::Io | Category::Data => INVALID_JSON_MESSAGE.to_string(),
    })
}

fn required(form: &BTreeMap<String, String>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match form.get(field) {
        Some(value) if !value.is_empty() => Some(value.clone()),
        _ => {
            errors.add(field, REQUIRED_MESSAGE);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid_object_payload() {
        let input = form(&[
            ("payload", "{}"),
            ("environmentId", "e1"),
            ("versionId", "v1"),
        ]);
        let command = validate(&input).unwrap();
        assert_eq!(command.payload, json!({}));
        assert_eq!(command.environment_id, "e1");
        assert_eq!(command.version_id, "v1");
        assert!(command.account_id.is_none());
    }

    #[test]
    fn test_any_json_type_is_accepted() {
        for (text, expected) in [
            ("[1,2,3]", json!([1, 2, 3])),
            ("\"hello\"", json!("hello")),
            ("42", json!(42)),
            ("null", json!(null)),
            ("{\n  \"nested\": {\"a\": [true]}\n}", json!({"nested": {"a": [true]}})),
        ] {
            let input = form(&[("payload", text), ("environmentId", "e1"), ("versionId", "v1")]);
            assert_eq!(validate(&input).unwrap().payload, expected, "payload {}", text);
        }
    }

    #[test]
    fn test_invalid_json_reports_parser_message() {
        let input = form(&[
            ("payload", "{not json"),
            ("environmentId", "e1"),
            ("versionId", "v1"),
        ]);
        let errors = validate(&input).unwrap_err();
        let message = errors.first("payload").unwrap();
        assert!(message.contains("line 1"), "unexpected message: {}", message);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_payload_text_is_a_parse_error() {
        let input = form(&[("payload", ""), ("environmentId", "e1"), ("versionId", "v1")]);
        let errors = validate(&input).unwrap_err();
        assert!(errors.first("payload").unwrap().contains("EOF"));
    }

    #[test]
    fn test_reports_every_failing_field() {
        let input = form(&[("payload", "{"), ("versionId", "")]);
        let errors = validate(&input).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.first("payload").is_some());
        assert_eq!(errors.first("environmentId"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.first("versionId"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_missing_payload_is_required() {
        let input = form(&[("environmentId", "e1"), ("versionId", "v1")]);
        let errors = validate(&input).unwrap_err();
        assert_eq!(errors.first("payload"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_account_id_passthrough_and_empty_normalization() {
        let with = form(&[
            ("payload", "{}"),
            ("environmentId", "e1"),
            ("versionId", "v1"),
            ("accountId", "acct_9"),
        ]);
        assert_eq!(validate(&with).unwrap().account_id.as_deref(), Some("acct_9"));

        let empty = form(&[
            ("payload", "{}"),
            ("environmentId", "e1"),
            ("versionId", "v1"),
            ("accountId", ""),
        ]);
        assert!(validate(&empty).unwrap().account_id.is_none());
    }
}
