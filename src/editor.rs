//! Test editor state machine.
//!
//! All authoring state lives in one [`TestEditor`] record. Each user or
//! network event is a transition on that record:
//!
//! - `SelectSource(id)`: select an example or recent run and load its text
//! - `EditText(text)`: replace the buffer; diverging from the selected
//!   source's text drops the selection
//! - `SelectEnvironment(id)`: switch target; payload state is untouched
//! - `SetAccountId(text)`: only submitted when the environment has an auth
//!   resolver
//! - `Submit`: compose the outbound fields; rejected while one is pending
//! - `Settle(response)`: finish the pending submit
//! - `Fail(failure)`: the pending submit ended in a fatal handler error
//!
//! Invariant after every transition: if a source is selected, the buffer
//! equals that source's text.

use testrun_protocol::{
    FieldErrors, FlashMessage, HandlerFailure, PageResponse, SubmitFields, TestPageData,
};
use tracing::debug;

use crate::composer::compose;
use crate::environment::{EmptyEnvironments, EnvironmentSelection, UnknownEnvironment};
use crate::resolver::{self, PayloadSource};

/// Which payload source, if any, the buffer mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Unselected,
    Source(String),
}

impl Selection {
    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::Unselected => None,
            Selection::Source(id) => Some(id.as_str()),
        }
    }
}

/// Editor events.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SelectSource(String),
    EditText(String),
    SelectEnvironment(String),
    SetAccountId(String),
    Submit,
    Settle(PageResponse),
    Fail(HandlerFailure),
}

/// Work the caller must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Nothing to do beyond re-rendering.
    None,
    /// Post these fields to the page handler.
    Post(SubmitFields),
    /// Leave the editor for another location.
    Navigate { location: String, flash: FlashMessage },
}

/// Reasons an event was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("A submission is already in progress")]
    SubmitPending,

    #[error("No submission is in progress")]
    NothingPending,

    #[error("Unexpected response to a submission: {0}")]
    UnexpectedResponse(&'static str),

    #[error("Unknown payload source: {0}")]
    UnknownSource(String),

    #[error(transparent)]
    UnknownEnvironment(#[from] UnknownEnvironment),
}

/// Authoring state for one test page view.
#[derive(Debug, Clone)]
pub struct TestEditor {
    data: TestPageData,
    selection: Selection,
    buffer: String,
    environment: EnvironmentSelection,
    account_id: Option<String>,
    pending: bool,
    field_errors: FieldErrors,
    failure: Option<HandlerFailure>,
}

impl TestEditor {
    /// Start editing a freshly loaded page.
    ///
    /// Selects the first example, else the first recent run; with neither the
    /// buffer starts from the empty-object template.
    pub fn new(data: TestPageData) -> Result<Self, EmptyEnvironments> {
        let environment = EnvironmentSelection::new(data.environments.clone())?;
        let selection = match resolver::default_selection(&data.examples, &data.runs) {
            Some(id) => Selection::Source(id),
            None => Selection::Unselected,
        };
        let buffer = resolver::initial_buffer(&data.examples, &data.runs);

        Ok(Self {
            data,
            selection,
            buffer,
            environment,
            account_id: None,
            pending: false,
            field_errors: FieldErrors::new(),
            failure: None,
        })
    }

    pub fn data(&self) -> &TestPageData {
        &self.data
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn environment(&self) -> &EnvironmentSelection {
        &self.environment
    }

    /// Account id as entered, even if the current environment hides it.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Field errors from the last settled submission.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Fatal error that ended the last submission, if any.
    pub fn failure(&self) -> Option<&HandlerFailure> {
        self.failure.as_ref()
    }

    /// The source the buffer currently mirrors.
    pub fn source(&self) -> PayloadSource<'_> {
        resolver::source_of(self.selection.id(), &self.data.examples, &self.data.runs)
    }

    /// Apply one event.
    pub fn apply(&mut self, event: EditorEvent) -> Result<Effect, EditorError> {
        match event {
            EditorEvent::SelectSource(id) => self.select_source(&id).map(|_| Effect::None),
            EditorEvent::EditText(text) => {
                self.edit_text(text);
                Ok(Effect::None)
            }
            EditorEvent::SelectEnvironment(id) => {
                self.environment.select(&id)?;
                Ok(Effect::None)
            }
            EditorEvent::SetAccountId(text) => {
                self.set_account_id(text);
                Ok(Effect::None)
            }
            EditorEvent::Submit => self.submit().map(Effect::Post),
            EditorEvent::Settle(response) => self.settle(response),
            EditorEvent::Fail(failure) => self.fail(failure),
        }
    }

    /// Select a source and reset the buffer to its text.
    pub fn select_source(&mut self, id: &str) -> Result<(), EditorError> {
        let text = resolver::resolve(Some(id), &self.data.examples, &self.data.runs)
            .ok_or_else(|| EditorError::UnknownSource(id.to_string()))?
            .to_string();
        self.selection = Selection::Source(id.to_string());
        self.buffer = text;
        Ok(())
    }

    /// Replace the buffer with edited text.
    pub fn edit_text(&mut self, text: String) {
        let diverged = self
            .source()
            .text()
            .is_some_and(|source_text| source_text != text);
        if diverged {
            debug!(source = ?self.selection.id(), "buffer diverged from source");
            self.selection = Selection::Unselected;
        }
        self.buffer = text;
    }

    pub fn select_environment(&mut self, id: &str) -> Result<(), EditorError> {
        Ok(self.environment.select(id)?)
    }

    pub fn set_account_id(&mut self, text: String) {
        self.account_id = if text.is_empty() { None } else { Some(text) };
    }

    /// Compose the outbound fields and mark the submission pending.
    pub fn submit(&mut self) -> Result<SubmitFields, EditorError> {
        if self.pending {
            return Err(EditorError::SubmitPending);
        }

        let account_id = if self.environment.account_id_field_visible() {
            self.account_id.as_deref()
        } else {
            None
        };
        let fields = compose(
            &self.buffer,
            self.environment.selected_environment_id(),
            self.environment.environments(),
            account_id,
        );

        self.pending = true;
        self.field_errors = FieldErrors::new();
        self.failure = None;
        Ok(fields)
    }

    /// Finish the pending submission with the handler's response.
    ///
    /// Validation failures keep the buffer and record the field errors. A
    /// page view is never an answer to a submission and is rejected; the
    /// submission is no longer pending either way.
    pub fn settle(&mut self, response: PageResponse) -> Result<Effect, EditorError> {
        if !self.pending {
            return Err(EditorError::NothingPending);
        }
        self.pending = false;

        match response {
            PageResponse::ValidationFailed { errors } => {
                self.field_errors = errors;
                Ok(Effect::None)
            }
            PageResponse::Redirect { location, flash } => Ok(Effect::Navigate { location, flash }),
            PageResponse::View(_) => Err(EditorError::UnexpectedResponse("view")),
        }
    }

    /// Finish the pending submission with a fatal handler error.
    ///
    /// Selection and buffer are kept so the user can retry.
    pub fn fail(&mut self, failure: HandlerFailure) -> Result<Effect, EditorError> {
        if !self.pending {
            return Err(EditorError::NothingPending);
        }
        self.pending = false;
        debug!(code = %failure.code, "submission failed");
        self.failure = Some(failure);
        Ok(Effect::None)
    }

    /// Whether the selection/buffer invariant holds.
    pub fn is_consistent(&self) -> bool {
        match self.selection {
            Selection::Unselected => true,
            Selection::Source(_) => self.source().text() == Some(self.buffer.as_str()),
        }
    }
}
