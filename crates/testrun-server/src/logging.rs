//! Stderr logging setup for the binaries.
//!
//! Stdout carries the response, so log lines go to stderr.

use tracing::level_filters::LevelFilter;

/// Install the global fmt subscriber at the given level.
///
/// Unknown level names fall back to `info`. Installing twice is a no-op.
pub fn init(level: &str) {
    let filter = parse_level(level);
    let _ = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse a level name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::INFO)
}
