//! In-memory job store.
//!
//! Serves page data and creates runs from a catalog document. Used by the
//! `testrun-server` binary, the local CLI, and tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use testrun_protocol::{Environment, ExamplePayload, RecentRun, Run, SubmissionCommand, TestPageData};
use tracing::debug;
use ulid::Ulid;

use crate::config::ServerConfig;
use crate::route::RouteParams;
use crate::services::{RunCreator, ServiceError, TestDataSource};

/// Errors loading a catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Catalog document: page data for every known job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub jobs: Vec<JobEntry>,
}

/// Page data for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEntry {
    pub organization: String,
    pub project: String,
    pub job: String,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub examples: Vec<ExamplePayload>,
    /// Most recent first.
    #[serde(default)]
    pub runs: Vec<RecentRun>,
}

impl JobEntry {
    fn key(&self) -> JobKey {
        (self.organization.clone(), self.project.clone(), self.job.clone())
    }
}

impl Catalog {
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

type JobKey = (String, String, String);

fn key_for(params: &RouteParams) -> JobKey {
    (
        params.organization_slug.clone(),
        params.project_slug.clone(),
        params.job_slug.clone(),
    )
}

/// Failure injection configuration.
#[derive(Debug, Clone, Default)]
pub struct FailureInjection {
    /// Make every run creation fail.
    pub fail_run_creation: bool,
    /// Make every page load fail.
    pub fetch_unavailable: bool,
}

/// Thread-safe in-memory store.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug)]
struct StoreInner {
    jobs: HashMap<JobKey, JobEntry>,
    /// Every command accepted by `create`, in order.
    created: Vec<(Run, SubmissionCommand)>,
    /// Number of `create` calls, successful or not.
    create_calls: usize,
    failure_injection: FailureInjection,
    recent_run_limit: usize,
}

impl InMemoryStore {
    pub fn new(catalog: Catalog, config: &ServerConfig) -> Self {
        let jobs = catalog
            .jobs
            .into_iter()
            .map(|entry| (entry.key(), entry))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                jobs,
                created: Vec::new(),
                create_calls: 0,
                failure_injection: FailureInjection::default(),
                recent_run_limit: config.recent_run_limit,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configure failure injection.
    pub fn set_failure_injection(&self, injection: FailureInjection) {
        self.write().failure_injection = injection;
    }

    /// Add or replace a job entry.
    pub fn insert_job(&self, entry: JobEntry) {
        self.write().jobs.insert(entry.key(), entry);
    }

    /// Runs created so far with the command that created them.
    pub fn created_runs(&self) -> Vec<(Run, SubmissionCommand)> {
        self.read().created.clone()
    }

    /// Number of times run creation was attempted.
    pub fn create_calls(&self) -> usize {
        self.read().create_calls
    }

    /// Snapshot the catalog, e.g. to persist it.
    pub fn catalog(&self) -> Catalog {
        let inner = self.read();
        let mut jobs: Vec<JobEntry> = inner.jobs.values().cloned().collect();
        jobs.sort_by_key(|entry| entry.key());
        Catalog { jobs }
    }
}

impl TestDataSource for InMemoryStore {
    fn load(&self, params: &RouteParams) -> Result<TestPageData, ServiceError> {
        let inner = self.read();
        if inner.failure_injection.fetch_unavailable {
            return Err(ServiceError::Unavailable("fetch failure injected".to_string()));
        }
        let entry = inner
            .jobs
            .get(&key_for(params))
            .ok_or_else(|| ServiceError::JobNotFound(params.to_string()))?;
        Ok(TestPageData {
            environments: entry.environments.clone(),
            runs: entry.runs.clone(),
            examples: entry.examples.clone(),
        })
    }
}

impl RunCreator for InMemoryStore {
    fn create(&self, params: &RouteParams, command: &SubmissionCommand) -> Option<Run> {
        let mut inner = self.write();
        inner.create_calls += 1;
        if inner.failure_injection.fail_run_creation {
            debug!(job = %params, "run creation failure injected");
            return None;
        }

        let limit = inner.recent_run_limit;
        let entry = inner.jobs.get_mut(&key_for(params))?;
        let environment = entry
            .environments
            .iter()
            .find(|env| env.id == command.environment_id)?;
        if environment.version_id != command.version_id {
            debug!(
                environment = %environment.id,
                expected = %environment.version_id,
                actual = %command.version_id,
                "version does not match environment"
            );
            return None;
        }

        let run = Run {
            id: format!("run_{}", Ulid::new().to_string().to_lowercase()),
        };
        let number = entry.runs.iter().map(|r| r.number).max().unwrap_or(0) + 1;
        entry.runs.insert(
            0,
            RecentRun {
                id: run.id.clone(),
                number,
                payload: serde_json::to_string_pretty(&command.payload).unwrap_or_default(),
                created_at: Utc::now(),
            },
        );
        entry.runs.truncate(limit);

        inner.created.push((run.clone(), command.clone()));
        Some(run)
    }
}
