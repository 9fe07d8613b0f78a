//! Route parameters and path builders.
//!
//! Test pages live at `/orgs/{org}/projects/{project}/jobs/{job}/test`; the
//! run dashboard a successful submission lands on is
//! `/orgs/{org}/projects/{project}/jobs/{job}/runs/{run}/trigger`.

use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;

/// Errors parsing route parameters. Fatal to the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Path does not match a job test route: {0}")]
    NoMatch(String),

    #[error("Invalid {param} slug: {value:?}")]
    InvalidSlug { param: &'static str, value: String },
}

fn route_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/orgs/([^/]+)/projects/([^/]+)/jobs/([^/]+)/test/?$")
            .expect("route pattern is valid")
    })
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("slug pattern is valid"))
}

/// Organization, project and job identifiers taken from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteParams {
    pub organization_slug: String,
    pub project_slug: String,
    pub job_slug: String,
}

impl RouteParams {
    /// Build params from individual slugs, validating each.
    pub fn new(organization: &str, project: &str, job: &str) -> Result<Self, RouteError> {
        Ok(Self {
            organization_slug: check_slug("organization", organization)?,
            project_slug: check_slug("project", project)?,
            job_slug: check_slug("job", job)?,
        })
    }

    /// Parse params from a request path. Query strings are ignored.
    pub fn parse_path(path: &str) -> Result<Self, RouteError> {
        let path = path.split('?').next().unwrap_or_default();
        let caps = route_re()
            .captures(path)
            .ok_or_else(|| RouteError::NoMatch(path.to_string()))?;
        Self::new(&caps[1], &caps[2], &caps[3])
    }

    /// Path of the job's test page.
    pub fn test_path(&self) -> String {
        format!("{}/test", self.job_path())
    }

    /// Path of a run's dashboard.
    pub fn run_dashboard_path(&self, run_id: &str) -> String {
        format!("{}/runs/{}/trigger", self.job_path(), run_id)
    }

    fn job_path(&self) -> String {
        format!(
            "/orgs/{}/projects/{}/jobs/{}",
            self.organization_slug, self.project_slug, self.job_slug
        )
    }
}

impl fmt::Display for RouteParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.organization_slug, self.project_slug, self.job_slug)
    }
}

fn check_slug(param: &'static str, value: &str) -> Result<String, RouteError> {
    if slug_re().is_match(value) {
        Ok(value.to_string())
    } else {
        Err(RouteError::InvalidSlug {
            param,
            value: value.to_string(),
        })
    }
}
