//! Collaborator seams for the page handler.

use testrun_protocol::{Run, SubmissionCommand, TestPageData};

use crate::route::RouteParams;

/// Errors from the data-fetch service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

/// Loads the environments, recent runs and examples for a job.
pub trait TestDataSource {
    fn load(&self, params: &RouteParams) -> Result<TestPageData, ServiceError>;
}

/// Creates a run from a validated submission.
///
/// `None` means the run could not be started; no detail is available.
pub trait RunCreator {
    fn create(&self, params: &RouteParams, command: &SubmissionCommand) -> Option<Run>;
}
