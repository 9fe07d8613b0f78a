//! Job Test Run - author and submit test payloads
//!
//! Client side of the test run workflow: pick a payload source (an example
//! or a recent run) or edit freely, pick a target environment, and compose
//! the fields posted to the page handler in `testrun-server`.

pub mod composer;
pub mod config;
pub mod editor;
pub mod environment;
pub mod resolver;

pub use composer::compose;
pub use config::{ClientConfig, ConfigError, LoadedConfig};
pub use editor::{EditorError, EditorEvent, Effect, Selection, TestEditor};
pub use environment::{EmptyEnvironments, EnvironmentSelection, UnknownEnvironment};
pub use resolver::{default_selection, resolve, PayloadSource};
