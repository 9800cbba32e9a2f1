//! Tracing setup for the command-line entry point.
//!
//! The library only emits events; installing a subscriber is the binary's
//! job. Output goes to stderr so stdout stays valid JSON.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install a stderr formatter filtered by `directives` (e.g. `warn`,
/// `game_support=debug`).
pub fn init(directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .map_err(|err| anyhow!("invalid log filter '{directives}': {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("installing log subscriber: {err}"))
}
