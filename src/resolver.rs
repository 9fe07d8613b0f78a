//! Payload source resolution.
//!
//! A selection id names either an example or a recent run. Examples are
//! searched first, so an id present in both sets resolves to the example.
//! Anything else means the user is editing freely.

use testrun_protocol::{ExamplePayload, RecentRun, EMPTY_PAYLOAD_TEMPLATE};

/// Where the editor text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource<'a> {
    Example(&'a ExamplePayload),
    RecentRun(&'a RecentRun),
    UserEdited,
}

impl<'a> PayloadSource<'a> {
    /// Canonical text of the source, if it has one.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            PayloadSource::Example(example) => Some(example.payload.as_str()),
            PayloadSource::RecentRun(run) => Some(run.payload.as_str()),
            PayloadSource::UserEdited => None,
        }
    }
}

/// Classify a selection id.
pub fn source_of<'a>(
    selected_id: Option<&str>,
    examples: &'a [ExamplePayload],
    runs: &'a [RecentRun],
) -> PayloadSource<'a> {
    let Some(id) = selected_id else {
        return PayloadSource::UserEdited;
    };

    if let Some(example) = examples.iter().find(|e| e.id == id) {
        return PayloadSource::Example(example);
    }
    if let Some(run) = runs.iter().find(|r| r.id == id) {
        return PayloadSource::RecentRun(run);
    }
    PayloadSource::UserEdited
}

/// Text for a selection id, or `None` to keep the free-edit buffer.
pub fn resolve<'a>(
    selected_id: Option<&str>,
    examples: &'a [ExamplePayload],
    runs: &'a [RecentRun],
) -> Option<&'a str> {
    source_of(selected_id, examples, runs).text()
}

/// Selection on first load: the first example, else the first recent run.
pub fn default_selection(examples: &[ExamplePayload], runs: &[RecentRun]) -> Option<String> {
    examples
        .first()
        .map(|e| e.id.clone())
        .or_else(|| runs.first().map(|r| r.id.clone()))
}

/// Buffer text on first load.
pub fn initial_buffer(examples: &[ExamplePayload], runs: &[RecentRun]) -> String {
    let selected = default_selection(examples, runs);
    resolve(selected.as_deref(), examples, runs)
        .unwrap_or(EMPTY_PAYLOAD_TEMPLATE)
        .to_string()
}
