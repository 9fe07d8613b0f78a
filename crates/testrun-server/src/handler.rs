//! Test page request handler.
//!
//! GET returns the page data for the job named in the path. POST validates
//! the submitted fields, asks the run creator for a new run, and answers with
//! one of three outcomes: the field errors, a redirect back to the referring
//! page with an error flash, or a redirect to the new run's dashboard with a
//! success flash.
//!
//! Route parameters are parsed before anything else; a bad route is fatal and
//! the form is never looked at.

use std::io::{self, BufRead, Write};

use testrun_protocol::{
    validate, ErrorCode, FlashMessage, HandlerFailure, Method, PageEnvelope, PageRequest,
    PageResponse, RUN_CREATED_MESSAGE, RUN_FAILED_MESSAGE,
};
use tracing::{debug, info, warn};

use crate::route::{RouteError, RouteParams};
use crate::services::{RunCreator, ServiceError, TestDataSource};

/// Fatal request errors.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid route: {0}")]
    Route(#[from] RouteError),

    #[error("Failed to load page data: {0}")]
    Fetch(#[from] ServiceError),

    #[error("Method not allowed: {0:?}")]
    MethodNotAllowed(Method),
}

impl HandlerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HandlerError::Route(_) => ErrorCode::InvalidRoute,
            HandlerError::Fetch(_) => ErrorCode::FetchFailed,
            HandlerError::MethodNotAllowed(_) => ErrorCode::MethodNotAllowed,
        }
    }

    /// Convert to the wire form.
    pub fn to_failure(&self) -> HandlerFailure {
        HandlerFailure::new(self.code(), self.to_string())
    }
}

/// Request handler for job test pages.
pub struct PageHandler<D, C> {
    data: D,
    runs: C,
}

impl<D: TestDataSource, C: RunCreator> PageHandler<D, C> {
    pub fn new(data: D, runs: C) -> Self {
        Self { data, runs }
    }

    /// Handle one request to completion.
    pub fn handle(&self, request: &PageRequest) -> Result<PageResponse, HandlerError> {
        let params = RouteParams::parse_path(&request.path)?;

        match request.method {
            Method::Get => self.load(&params),
            Method::Post => Ok(self.submit(&params, request)),
            other => Err(HandlerError::MethodNotAllowed(other)),
        }
    }

    fn load(&self, params: &RouteParams) -> Result<PageResponse, HandlerError> {
        let data = self.data.load(params)?;
        debug!(
            job = %params,
            environments = data.environments.len(),
            runs = data.runs.len(),
            examples = data.examples.len(),
            "loaded test page"
        );
        Ok(PageResponse::View(data))
    }

    fn submit(&self, params: &RouteParams, request: &PageRequest) -> PageResponse {
        let command = match validate(&request.form) {
            Ok(command) => command,
            Err(errors) => {
                debug!(job = %params, fields = %errors, "submission failed validation");
                return PageResponse::ValidationFailed { errors };
            }
        };

        match self.runs.create(params, &command) {
            Some(run) => {
                info!(job = %params, run = %run.id, environment = %command.environment_id, "test run created");
                PageResponse::Redirect {
                    location: params.run_dashboard_path(&run.id),
                    flash: FlashMessage::success(RUN_CREATED_MESSAGE),
                }
            }
            None => {
                warn!(job = %params, environment = %command.environment_id, "unable to start test run");
                let location = request
                    .referer
                    .clone()
                    .filter(|referer| !referer.is_empty())
                    .unwrap_or_else(|| params.test_path());
                PageResponse::Redirect {
                    location,
                    flash: FlashMessage::error(RUN_FAILED_MESSAGE),
                }
            }
        }
    }

    /// Serve a single request from stdin, writing the envelope to stdout.
    pub fn run(&self) -> io::Result<()> {
        self.run_with_io(&mut io::stdin().lock(), &mut io::stdout().lock())
    }

    /// Serve a single request with custom I/O (for testing).
    pub fn run_with_io<R: BufRead, W: Write>(&self, reader: &mut R, writer: &mut W) -> io::Result<()> {
        let envelope = match read_request(reader) {
            Ok(request) => match self.handle(&request) {
                Ok(response) => PageEnvelope::success(response),
                Err(e) => {
                    warn!(path = %request.path, error = %e, "request failed");
                    PageEnvelope::error(e.to_failure())
                }
            },
            Err(failure) => PageEnvelope::error(failure),
        };
        write_envelope(writer, &envelope)
    }
}

fn read_request<R: BufRead>(reader: &mut R) -> Result<PageRequest, HandlerFailure> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| HandlerFailure::invalid_request(format!("failed to read request: {}", e)))?;

    serde_json::from_str(&line)
        .map_err(|e| HandlerFailure::invalid_request(format!("invalid JSON: {}", e)))
}

fn write_envelope<W: Write>(writer: &mut W, envelope: &PageEnvelope) -> io::Result<()> {
    let json = serde_json::to_string(envelope)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)?;
    writer.flush()
}
