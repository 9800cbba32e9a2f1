//! Capability probes for game hosts.
//!
//! The crate exposes a registry of independent probes (storage, graphics,
//! audio, networking, input, experience, performance), the versioned table
//! that declares the canonical game-support probes, and the host seam the
//! probes query. Public functions here form the contract the CLI and the
//! wasm entry points depend on: table loading, registry construction, and
//! `category.name` query parsing.

use anyhow::{Result, bail};

pub mod catalog;
pub mod config;
pub mod host;
pub mod logging;
pub mod probe;
pub mod registry;
pub mod report;
#[cfg(not(target_arch = "wasm32"))]
mod schema_loader;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use catalog::{
    CapabilityCategory, CapabilityEntry, CapabilityName, CapabilityTable, ProbeStrategy,
    TableIndex, TableKey, ValueKind,
};
pub use host::{HostEnvironment, ProfileHost};
pub use probe::{FnProbe, Probe, ProbeError, ProbeValue, UNKNOWN_COUNT, count_probe, flag_probe};
pub use registry::{Capability, CapabilityRegistry, RegistryError};
pub use report::CapabilityReport;

/// Evaluate the builtin game-support table once against `host`.
pub fn game_support<H: HostEnvironment>(host: H) -> Result<CapabilityReport> {
    let index = TableIndex::builtin()?;
    let mut registry = CapabilityRegistry::from_table(index.table(), host);
    Ok(registry.evaluate())
}

/// Split comma- or whitespace-delimited lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a `category.name` query.
pub fn parse_query(query: &str) -> Result<(String, String)> {
    let trimmed = query.trim();
    match trimmed.split_once('.') {
        Some((category, name)) if !category.is_empty() && !name.is_empty() => {
            Ok((category.to_string(), name.to_string()))
        }
        _ => bail!("Capability query must look like CATEGORY.NAME, got '{query}'"),
    }
}
