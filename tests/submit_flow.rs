//! End-to-end submission tests: editor → page handler → run creator.

mod fixtures;

use std::cell::RefCell;

use fixtures::*;
use job_testrun::{EditorEvent, Effect, TestEditor};
use serde_json::json;
use testrun_protocol::{
    ErrorCode, FlashKind, PageRequest, PageResponse, Run, SubmissionCommand, TestPageData,
};
use testrun_server::{
    FailureInjection, HandlerError, InMemoryStore, PageHandler, RouteParams, RunCreator,
};

/// Run creator that hands out a fixed run and records what it was given.
struct RecordingCreator {
    run_id: Option<&'static str>,
    seen: RefCell<Vec<SubmissionCommand>>,
}

impl RecordingCreator {
    fn new(run_id: Option<&'static str>) -> Self {
        Self {
            run_id,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl RunCreator for &RecordingCreator {
    fn create(&self, _params: &RouteParams, command: &SubmissionCommand) -> Option<Run> {
        self.seen.borrow_mut().push(command.clone());
        self.run_id.map(|id| Run { id: id.to_string() })
    }
}

fn load(store: &InMemoryStore) -> TestPageData {
    let handler = PageHandler::new(store.clone(), store.clone());
    match handler.handle(&PageRequest::get(TEST_PATH)).unwrap() {
        PageResponse::View(data) => data,
        other => panic!("expected view, got {:?}", other),
    }
}

fn post<C: RunCreator>(
    handler: &PageHandler<InMemoryStore, C>,
    editor: &mut TestEditor,
) -> (PageResponse, Effect) {
    let fields = match editor.apply(EditorEvent::Submit).unwrap() {
        Effect::Post(fields) => fields,
        other => panic!("expected post, got {:?}", other),
    };
    let request = PageRequest::post(TEST_PATH, fields.to_form()).with_referer(TEST_PATH);
    let response = handler.handle(&request).unwrap();
    let effect = editor.apply(EditorEvent::Settle(response.clone())).unwrap();
    (response, effect)
}

#[test]
fn test_invalid_json_stays_on_editor() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let creator = RecordingCreator::new(Some("run_1"));
    let handler = PageHandler::new(store.clone(), &creator);

    let mut editor = TestEditor::new(load(&store)).unwrap();
    editor.edit_text("{not json".to_string());
    let (response, effect) = post(&handler, &mut editor);

    assert!(!response.is_redirect());
    assert_eq!(effect, Effect::None);
    assert!(editor.field_errors().first("payload").is_some());
    assert_eq!(editor.buffer(), "{not json");
    assert!(creator.seen.borrow().is_empty());
}

#[test]
fn test_failed_creation_redirects_back_with_error() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    store.set_failure_injection(FailureInjection {
        fail_run_creation: true,
        ..Default::default()
    });
    let handler = PageHandler::new(store.clone(), store.clone());

    let mut editor = TestEditor::new(load(&store)).unwrap();
    editor.edit_text("{\"to\":\"a@example.com\"}".to_string());
    let (_, effect) = post(&handler, &mut editor);

    match effect {
        Effect::Navigate { location, flash } => {
            assert_eq!(location, TEST_PATH);
            assert_eq!(flash.kind, FlashKind::Error);
            assert_eq!(flash.message, "Unable to start a test run: Something went wrong.");
        }
        other => panic!("expected navigation, got {:?}", other),
    }
    assert_eq!(store.create_calls(), 1);
    assert!(store.created_runs().is_empty());
}

#[test]
fn test_created_run_redirects_to_dashboard() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let creator = RecordingCreator::new(Some("run_42"));
    let handler = PageHandler::new(store.clone(), &creator);

    let mut editor = TestEditor::new(load(&store)).unwrap();
    let (_, effect) = post(&handler, &mut editor);

    match effect {
        Effect::Navigate { location, flash } => {
            assert!(location.contains("run_42"), "location {}", location);
            assert_eq!(
                location,
                "/orgs/acme/projects/web/jobs/send-welcome-email/runs/run_42/trigger"
            );
            assert_eq!(flash.kind, FlashKind::Success);
            assert_eq!(flash.message, "Test run created.");
        }
        other => panic!("expected navigation, got {:?}", other),
    }
}

#[test]
fn test_command_payload_matches_parsed_text() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let creator = RecordingCreator::new(Some("run_1"));
    let handler = PageHandler::new(store.clone(), &creator);

    let texts = [
        ("{\"user\":{\"id\":7,\"tags\":[\"a\",\"b\"]}}", json!({"user": {"id": 7, "tags": ["a", "b"]}})),
        ("[]", json!([])),
        ("  \"plain string\"  ", json!("plain string")),
        ("3.5", json!(3.5)),
    ];
    for (text, _) in &texts {
        let mut editor = TestEditor::new(load(&store)).unwrap();
        editor.edit_text(text.to_string());
        post(&handler, &mut editor);
    }

    let seen = creator.seen.borrow();
    assert_eq!(seen.len(), texts.len());
    for (command, (_, expected)) in seen.iter().zip(texts.iter()) {
        assert_eq!(&command.payload, expected);
    }
}

#[test]
fn test_account_id_reaches_creator_only_for_auth_environment() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let creator = RecordingCreator::new(Some("run_1"));
    let handler = PageHandler::new(store.clone(), &creator);

    let mut editor = TestEditor::new(load(&store)).unwrap();
    editor.edit_text("{}".to_string());
    editor.set_account_id("acct_99".to_string());
    post(&handler, &mut editor);

    let mut editor = TestEditor::new(load(&store)).unwrap();
    editor.edit_text("{}".to_string());
    editor.select_environment("env_prod").unwrap();
    editor.set_account_id("acct_99".to_string());
    post(&handler, &mut editor);

    let seen = creator.seen.borrow();
    assert_eq!(seen[0].account_id, None);
    assert_eq!(seen[0].environment_id, "env_dev");
    assert_eq!(seen[1].account_id.as_deref(), Some("acct_99"));
    assert_eq!(seen[1].version_id, "ver_prod_7");
}

#[test]
fn test_retried_submit_creates_distinct_runs() {
    let store = store_with(page_data(
        standard_environments(),
        vec![example("welcome", "{\"to\":\"new@example.com\"}")],
        vec![],
    ));
    let handler = PageHandler::new(store.clone(), store.clone());

    let mut editor = TestEditor::new(load(&store)).unwrap();
    post(&handler, &mut editor);
    post(&handler, &mut editor);

    let created = store.created_runs();
    assert_eq!(created.len(), 2);
    assert_ne!(created[0].0.id, created[1].0.id);
}

#[test]
fn test_created_run_becomes_selectable_recent_run() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let handler = PageHandler::new(store.clone(), store.clone());

    let mut editor = TestEditor::new(load(&store)).unwrap();
    editor.edit_text("{\"n\":1}".to_string());
    post(&handler, &mut editor);
    let run_id = store.created_runs()[0].0.id.clone();

    let editor = TestEditor::new(load(&store)).unwrap();
    assert_eq!(editor.selection().id(), Some(run_id.as_str()));
    let payload: serde_json::Value = serde_json::from_str(editor.buffer()).unwrap();
    assert_eq!(payload, json!({"n": 1}));
}

#[test]
fn test_stale_version_fails_execution() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let handler = PageHandler::new(store.clone(), store.clone());
    let mut editor = TestEditor::new(load(&store)).unwrap();

    // The environment is redeployed after the page loaded.
    store.insert_job(job_entry(page_data(
        vec![environment("env_dev", "ver_dev_4", false)],
        vec![],
        vec![],
    )));

    let (response, _) = post(&handler, &mut editor);
    match response {
        PageResponse::Redirect { flash, .. } => assert_eq!(flash.kind, FlashKind::Error),
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[test]
fn test_bad_route_is_fatal() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let handler = PageHandler::new(store.clone(), store.clone());

    let mut form = std::collections::BTreeMap::new();
    form.insert("payload".to_string(), "{not json".to_string());
    let err = handler
        .handle(&PageRequest::post("/orgs/acme/projects/web/test", form))
        .unwrap_err();

    assert!(matches!(err, HandlerError::Route(_)));
    assert_eq!(store.create_calls(), 0);
}

#[test]
fn test_unknown_job_fails_to_load() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let handler = PageHandler::new(store.clone(), store.clone());

    let err = handler
        .handle(&PageRequest::get("/orgs/acme/projects/web/jobs/other/test"))
        .unwrap_err();
    assert!(matches!(err, HandlerError::Fetch(_)));
}

#[test]
fn test_fatal_error_allows_resubmit() {
    let store = store_with(page_data(standard_environments(), vec![], vec![]));
    let handler = PageHandler::new(store.clone(), store.clone());

    let mut editor = TestEditor::new(load(&store)).unwrap();
    editor.edit_text("{\"retry\":true}".to_string());

    let fields = match editor.apply(EditorEvent::Submit).unwrap() {
        Effect::Post(fields) => fields,
        other => panic!("expected post, got {:?}", other),
    };
    let err = handler
        .handle(&PageRequest::post("/orgs/acme/jobs/x/test", fields.to_form()))
        .unwrap_err();
    let effect = editor.apply(EditorEvent::Fail(err.to_failure())).unwrap();

    assert_eq!(effect, Effect::None);
    assert!(!editor.is_pending());
    assert_eq!(editor.failure().map(|f| f.code), Some(ErrorCode::InvalidRoute));
    assert_eq!(editor.buffer(), "{\"retry\":true}");

    let (_, effect) = post(&handler, &mut editor);
    match effect {
        Effect::Navigate { flash, .. } => assert_eq!(flash.kind, FlashKind::Success),
        other => panic!("expected navigation, got {:?}", other),
    }
    assert!(editor.failure().is_none());
    assert_eq!(store.created_runs().len(), 1);
}
