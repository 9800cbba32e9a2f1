//! Deserializable representation of `catalogs/game_support.json`.
//!
//! The types mirror `schema/capability_table.schema.json`. Use `TableIndex`
//! for validation and lookup; use these structs when the full table surface
//! is needed (descriptions, docs, strategies).

use crate::catalog::identity::{CapabilityCategory, CapabilityName, TableKey, ValueKind};
use crate::host::HostEnvironment;
use crate::probe::{Probe, ProbeError, ProbeValue, UNKNOWN_COUNT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Canonical game-support table, embedded so hosts without a filesystem can use it.
pub const BUILTIN_TABLE_JSON: &str = include_str!("../../catalogs/game_support.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Full capability table as stored on disk.
pub struct CapabilityTable {
    pub schema_version: String,
    pub table: TableInfo,
    pub categories: BTreeMap<String, String>,
    pub capabilities: Vec<CapabilityEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Identity of the table and the keys it replaces.
pub struct TableInfo {
    pub key: TableKey,
    pub title: String,
    #[serde(default)]
    pub supersedes: Vec<TableKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// One capability and the strategy used to probe it.
pub struct CapabilityEntry {
    pub name: CapabilityName,
    pub category: CapabilityCategory,
    pub description: String,
    #[serde(default)]
    pub docs: Option<String>,
    pub probe: ProbeStrategy,
}

/// Declarative probe strategies a table can use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ProbeStrategy {
    /// Every `all` path bound, and at least one `any` path bound when `any` is non-empty.
    Bindings {
        #[serde(default)]
        all: Vec<String>,
        #[serde(default)]
        any: Vec<String>,
    },
    /// `requires` bound and a trial construction of `constructor` succeeds.
    Construct {
        constructor: String,
        #[serde(default)]
        requires: Vec<String>,
    },
    /// `requires` bound and a scratch canvas yields a `context_id` context.
    CanvasContext {
        context_id: String,
        #[serde(default)]
        requires: Vec<String>,
    },
    /// Integer value at `path`.
    Integer { path: String },
}

impl ProbeStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ProbeStrategy::Bindings { .. } => "bindings",
            ProbeStrategy::Construct { .. } => "construct",
            ProbeStrategy::CanvasContext { .. } => "canvas_context",
            ProbeStrategy::Integer { .. } => "integer",
        }
    }

    /// Every binding path the strategy consults.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            ProbeStrategy::Bindings { all, any } => {
                all.iter().chain(any.iter()).map(String::as_str).collect()
            }
            ProbeStrategy::Construct { requires, .. }
            | ProbeStrategy::CanvasContext { requires, .. } => {
                requires.iter().map(String::as_str).collect()
            }
            ProbeStrategy::Integer { path } => vec![path.as_str()],
        }
    }
}

fn all_bound(host: &dyn HostEnvironment, paths: &[String]) -> bool {
    paths.iter().all(|path| host.has_binding(path))
}

impl Probe for ProbeStrategy {
    fn kind(&self) -> ValueKind {
        match self {
            ProbeStrategy::Integer { .. } => ValueKind::Count,
            _ => ValueKind::Flag,
        }
    }

    fn probe(&self, host: &dyn HostEnvironment) -> Result<ProbeValue, ProbeError> {
        match self {
            ProbeStrategy::Bindings { all, any } => {
                let any_bound = any.is_empty() || any.iter().any(|path| host.has_binding(path));
                Ok(ProbeValue::Flag(all_bound(host, all) && any_bound))
            }
            ProbeStrategy::Construct {
                constructor,
                requires,
            } => {
                if !all_bound(host, requires) {
                    return Ok(ProbeValue::Flag(false));
                }
                host.construct(constructor)?;
                Ok(ProbeValue::Flag(true))
            }
            ProbeStrategy::CanvasContext {
                context_id,
                requires,
            } => {
                if !all_bound(host, requires) {
                    return Ok(ProbeValue::Flag(false));
                }
                Ok(ProbeValue::Flag(host.canvas_context(context_id)?))
            }
            ProbeStrategy::Integer { path } => Ok(ProbeValue::Count(
                host.integer(path).unwrap_or(UNKNOWN_COUNT),
            )),
        }
    }
}

impl CapabilityTable {
    /// The embedded canonical table, parsed without further validation.
    pub fn builtin() -> Result<Self> {
        parse_table(BUILTIN_TABLE_JSON).context("parsing builtin capability table")
    }

    /// Read a table from disk without further validation.
    pub fn load(path: &Path) -> Result<Self> {
        load_table_from_path(path)
    }
}

/// Read and parse a capability table from disk without additional validation.
pub fn load_table_from_path(path: &Path) -> Result<CapabilityTable> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading capability table {}", path.display()))?;
    parse_table(&data).with_context(|| format!("parsing capability table {}", path.display()))
}

fn parse_table(data: &str) -> Result<CapabilityTable> {
    let table: CapabilityTable = serde_json::from_str(data)?;
    Ok(table)
}
