//! Job Test Run Server
//!
//! Serves job test pages: loads the page data for GET and turns POSTed
//! submissions into runs. Reads a single JSON request on stdin and writes a
//! single JSON envelope on stdout.
//!
//! This crate can be used in two modes:
//! - **Standalone binary**: `testrun-server rpc --catalog catalog.json`
//! - **In-process library**: the CLI and tests drive [`PageHandler`] directly

pub mod config;
pub mod handler;
pub mod logging;
pub mod route;
pub mod services;
pub mod store;

pub use config::{ConfigError, ServerConfig};
pub use handler::{HandlerError, PageHandler};
pub use route::{RouteError, RouteParams};
pub use services::{RunCreator, ServiceError, TestDataSource};
pub use store::{Catalog, CatalogError, FailureInjection, InMemoryStore, JobEntry};
