//! Page response types.

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, HandlerFailure};
use crate::model::TestPageData;

/// Tone of a flash message shown after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Outcome of a single page request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageResponse {
    /// Page data for a GET.
    View(TestPageData),
    /// The submission failed validation; the editor stays put.
    ValidationFailed { errors: FieldErrors },
    /// Navigate away, showing a flash message.
    Redirect { location: String, flash: FlashMessage },
}

impl PageResponse {
    pub fn is_redirect(&self) -> bool {
        matches!(self, PageResponse::Redirect { .. })
    }
}

/// Response envelope written by the page handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    /// Whether the request was served. Validation failures are still `ok`.
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<PageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HandlerFailure>,
}

impl PageEnvelope {
    pub fn success(response: PageResponse) -> Self {
        Self {
            ok: true,
            response: Some(response),
            error: None,
        }
    }

    pub fn error(error: HandlerFailure) -> Self {
        Self {
            ok: false,
            response: None,
            error: Some(error),
        }
    }
}
