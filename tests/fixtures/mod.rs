//! Shared builders for the integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use testrun_protocol::{Environment, EnvironmentKind, ExamplePayload, RecentRun, TestPageData};
use testrun_server::{Catalog, InMemoryStore, JobEntry, ServerConfig};

pub const ORG: &str = "acme";
pub const PROJECT: &str = "web";
pub const JOB: &str = "send-welcome-email";
pub const TEST_PATH: &str = "/orgs/acme/projects/web/jobs/send-welcome-email/test";

pub fn environment(id: &str, version_id: &str, has_auth_resolver: bool) -> Environment {
    Environment {
        id: id.to_string(),
        version_id: version_id.to_string(),
        has_auth_resolver,
        slug: format!("{}-slug", id),
        kind: EnvironmentKind::Development,
    }
}

pub fn example(id: &str, payload: &str) -> ExamplePayload {
    ExamplePayload {
        id: id.to_string(),
        name: format!("Example {}", id),
        payload: payload.to_string(),
        icon: None,
    }
}

pub fn recent_run(id: &str, number: u64, payload: &str) -> RecentRun {
    RecentRun {
        id: id.to_string(),
        number,
        payload: payload.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    }
}

/// One plain environment and one that resolves accounts.
pub fn standard_environments() -> Vec<Environment> {
    vec![
        environment("env_dev", "ver_dev_3", false),
        environment("env_prod", "ver_prod_7", true),
    ]
}

pub fn page_data(
    environments: Vec<Environment>,
    examples: Vec<ExamplePayload>,
    runs: Vec<RecentRun>,
) -> TestPageData {
    TestPageData {
        environments,
        runs,
        examples,
    }
}

pub fn job_entry(data: TestPageData) -> JobEntry {
    JobEntry {
        organization: ORG.to_string(),
        project: PROJECT.to_string(),
        job: JOB.to_string(),
        environments: data.environments,
        examples: data.examples,
        runs: data.runs,
    }
}

pub fn store_with(data: TestPageData) -> InMemoryStore {
    InMemoryStore::new(
        Catalog {
            jobs: vec![job_entry(data)],
        },
        &ServerConfig::default(),
    )
}
