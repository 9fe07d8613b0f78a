//! Page request types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Request envelope.
///
/// The page handler accepts a single JSON request per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub method: Method,
    /// Request path, e.g. `/orgs/acme/projects/web/jobs/send-email/test`.
    pub path: String,
    /// Referring location; execution failures redirect back here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Submitted form fields (POST only).
    #[serde(default)]
    pub form: BTreeMap<String, String>,
}

impl PageRequest {
    /// Build a GET request for a page path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            referer: None,
            form: BTreeMap::new(),
        }
    }

    /// Build a POST request carrying form fields.
    pub fn post(path: impl Into<String>, form: BTreeMap<String, String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            referer: None,
            form,
        }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}
