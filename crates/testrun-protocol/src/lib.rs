//! Job Test Run Protocol Types
//!
//! Shared types for authoring and submitting test payloads: the page data
//! model, the outbound submit fields, the validation schema that turns those
//! fields into a [`SubmissionCommand`], and the request/response envelope
//! exchanged with the page handler.

pub mod error;
pub mod fields;
pub mod model;
pub mod request;
pub mod response;
pub mod schema;

pub use error::{ErrorCode, FieldErrors, HandlerFailure};
pub use fields::{SubmitFields, SubmissionCommand};
pub use model::{Environment, EnvironmentKind, ExamplePayload, RecentRun, Run, TestPageData};
pub use request::{Method, PageRequest};
pub use response::{FlashKind, FlashMessage, PageEnvelope, PageResponse};
pub use schema::validate;

/// Buffer contents when no payload source is selected.
pub const EMPTY_PAYLOAD_TEMPLATE: &str = "{\n\n}";

/// Flash message attached to the redirect after a run is created.
pub const RUN_CREATED_MESSAGE: &str = "Test run created.";

/// Flash message attached to the redirect when the run could not be created.
pub const RUN_FAILED_MESSAGE: &str = "Unable to start a test run: Something went wrong.";
