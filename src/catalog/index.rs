//! Validated, indexed view of a capability table.
//!
//! The index is strict: it rejects unknown schema versions, undeclared
//! categories, duplicate names and malformed strategies so a broken table
//! fails at load time instead of producing a silently different report.

use crate::catalog::{
    CapabilityCategory, CapabilityEntry, CapabilityName, CapabilityTable, ProbeStrategy, TableKey,
};
use crate::host::is_valid_path;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Table format version this build understands.
pub const TABLE_SCHEMA_VERSION: &str = "capability_table_v1";

#[derive(Debug)]
/// Capability table plus a derived index keyed by `(category, name)`.
pub struct TableIndex {
    table: CapabilityTable,
    by_key: BTreeMap<(CapabilityCategory, CapabilityName), usize>,
}

impl TableIndex {
    /// Load, schema-check and index a table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading capability table {}", path.display()))?;
        Self::from_json(&data, &path.display().to_string())
    }

    /// Validate and index the embedded canonical table.
    pub fn builtin() -> Result<Self> {
        Self::from_json(crate::catalog::BUILTIN_TABLE_JSON, "builtin capability table")
    }

    /// Parse, schema-check and index a table held in memory.
    pub fn from_json(data: &str, origin: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(data).with_context(|| format!("parsing {origin}"))?;
        validate_against_schema(&value, origin)?;
        let table: CapabilityTable =
            serde_json::from_value(value).with_context(|| format!("decoding {origin}"))?;
        Self::build(table).with_context(|| format!("validating {origin}"))
    }

    /// Index an already-parsed table, enforcing the structural rules.
    pub fn build(table: CapabilityTable) -> Result<Self> {
        validate_schema_version(&table.schema_version)?;
        validate_table_info(&table)?;
        let by_key = build_index(&table)?;
        Ok(Self { table, by_key })
    }

    /// The table key declared in the loaded file.
    pub fn key(&self) -> &TableKey {
        &self.table.table.key
    }

    /// Resolve a capability entry.
    pub fn capability(
        &self,
        category: &CapabilityCategory,
        name: &CapabilityName,
    ) -> Option<&CapabilityEntry> {
        self.by_key
            .get(&(category.clone().normalized(), name.clone()))
            .map(|&idx| &self.table.capabilities[idx])
    }

    /// Entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = &CapabilityEntry> {
        self.table.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.table.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.capabilities.is_empty()
    }

    /// Access the underlying table (categories, descriptions, etc.).
    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    pub fn into_table(self) -> CapabilityTable {
        self.table
    }
}

fn validate_schema_version(schema_version: &str) -> Result<()> {
    if schema_version.is_empty() {
        bail!("schema_version must not be empty");
    }
    if schema_version != TABLE_SCHEMA_VERSION {
        bail!(
            "schema_version '{}' not supported (expected {})",
            schema_version,
            TABLE_SCHEMA_VERSION
        );
    }
    Ok(())
}

fn validate_table_info(table: &CapabilityTable) -> Result<()> {
    let key = &table.table.key.0;
    if key.is_empty() {
        bail!("table.key must not be empty");
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        bail!("table.key must match ^[A-Za-z0-9_.-]+$, got {}", key);
    }
    if table.table.title.trim().is_empty() {
        bail!("table.title must not be empty");
    }
    if table.table.supersedes.iter().any(|old| &old.0 == key) {
        bail!("table {} cannot supersede itself", key);
    }
    Ok(())
}

fn build_index(
    table: &CapabilityTable,
) -> Result<BTreeMap<(CapabilityCategory, CapabilityName), usize>> {
    if table.capabilities.is_empty() {
        bail!("table contains no capabilities");
    }

    let categories: BTreeSet<&str> = table.categories.keys().map(String::as_str).collect();
    if categories.is_empty() {
        bail!("table must declare at least one category");
    }

    let mut seen_names: BTreeMap<&CapabilityName, &CapabilityCategory> = BTreeMap::new();
    let mut map = BTreeMap::new();
    for (idx, cap) in table.capabilities.iter().enumerate() {
        if cap.name.0.trim().is_empty() {
            bail!("encountered capability with no name");
        }
        if !categories.contains(cap.category.as_str()) {
            bail!(
                "capability {} references unknown category {}",
                cap.name,
                cap.category
            );
        }
        if let Some(previous) = seen_names.insert(&cap.name, &cap.category) {
            if previous.as_str() == cap.category.as_str() {
                bail!("duplicate capability {}.{}", cap.category, cap.name);
            }
            bail!(
                "capability name {} is used by both {} and {}",
                cap.name,
                previous,
                cap.category
            );
        }
        validate_strategy(&cap.name, &cap.probe)?;
        map.insert((cap.category.clone().normalized(), cap.name.clone()), idx);
    }
    Ok(map)
}

fn validate_strategy(name: &CapabilityName, strategy: &ProbeStrategy) -> Result<()> {
    if let ProbeStrategy::Bindings { all, any } = strategy {
        if all.is_empty() && any.is_empty() {
            bail!("capability {} uses a bindings probe with no paths", name);
        }
    }
    for path in strategy.paths() {
        if !is_valid_path(path) {
            bail!("capability {} references malformed path '{}'", name, path);
        }
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn validate_against_schema(value: &Value, origin: &str) -> Result<()> {
    let schema = crate::schema_loader::load_table_schema()?;
    if schema.schema_version != TABLE_SCHEMA_VERSION {
        bail!(
            "embedded table schema declares {}, expected {}",
            schema.schema_version,
            TABLE_SCHEMA_VERSION
        );
    }
    schema.validate(value, origin)
}

#[cfg(target_arch = "wasm32")]
fn validate_against_schema(_value: &Value, _origin: &str) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_json(capabilities: Value) -> String {
        json!({
            "schema_version": "capability_table_v1",
            "table": {"key": "fixture_v1", "title": "Fixture"},
            "categories": {"graphics": "Rendering", "input": "Device input"},
            "capabilities": capabilities
        })
        .to_string()
    }

    fn err_chain(err: anyhow::Error) -> String {
        format!("{err:#}")
    }

    #[test]
    fn builtin_table_indexes() {
        let index = TableIndex::builtin().unwrap();
        assert_eq!(index.key().0, "game_support_v2");
        assert_eq!(index.len(), 27);
        assert_eq!(index.table().categories.len(), 7);
        let keyboard = index
            .capability(&CapabilityCategory::Input, &"keyboard".into())
            .unwrap();
        assert_eq!(keyboard.probe.name(), "bindings");
        assert!(
            index
                .capability(&CapabilityCategory::Graphics, &"keyboard".into())
                .is_none()
        );
    }

    #[test]
    fn rejects_unknown_category() {
        let data = table_json(json!([
            {"name": "canvas", "category": "audio", "description": "", "probe": {"strategy": "canvas_context", "context_id": "2d"}}
        ]));
        let err = TableIndex::from_json(&data, "fixture").unwrap_err();
        assert!(err_chain(err).contains("unknown category audio"));
    }

    #[test]
    fn rejects_duplicate_pair() {
        let probe = json!({"strategy": "bindings", "any": ["window.KeyboardEvent"]});
        let data = table_json(json!([
            {"name": "keyboard", "category": "input", "description": "", "probe": probe.clone()},
            {"name": "keyboard", "category": "input", "description": "", "probe": probe}
        ]));
        let err = TableIndex::from_json(&data, "fixture").unwrap_err();
        assert!(err_chain(err).contains("duplicate capability input.keyboard"));
    }

    #[test]
    fn rejects_name_shared_across_categories() {
        let probe = json!({"strategy": "bindings", "any": ["window.Touch"]});
        let data = table_json(json!([
            {"name": "touch", "category": "input", "description": "", "probe": probe.clone()},
            {"name": "touch", "category": "graphics", "description": "", "probe": probe}
        ]));
        let err = TableIndex::from_json(&data, "fixture").unwrap_err();
        assert!(err_chain(err).contains("used by both input and graphics"));
    }

    #[test]
    fn rejects_empty_bindings_probe() {
        let data = table_json(json!([
            {"name": "nothing", "category": "input", "description": "", "probe": {"strategy": "bindings"}}
        ]));
        let err = TableIndex::from_json(&data, "fixture").unwrap_err();
        assert!(err_chain(err).contains("bindings probe with no paths"));
    }

    #[test]
    fn schema_rejects_malformed_path() {
        let data = table_json(json!([
            {"name": "gamepad", "category": "input", "description": "", "probe": {"strategy": "bindings", "any": ["window..Gamepad"]}}
        ]));
        let err = TableIndex::from_json(&data, "fixture").unwrap_err();
        assert!(err_chain(err).contains("failed schema validation"));
    }

    #[test]
    fn build_rejects_malformed_path_without_schema() {
        let mut table = TableIndex::builtin().unwrap().into_table();
        table.capabilities[0].probe = ProbeStrategy::Integer {
            path: "navigator..cores".into(),
        };
        let err = TableIndex::build(table).unwrap_err();
        assert!(err.to_string().contains("malformed path"));
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let mut table = TableIndex::builtin().unwrap().into_table();
        table.schema_version = "capability_table_v9".into();
        let err = TableIndex::build(table).unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn rejects_blank_title_and_self_supersession() {
        let mut table = TableIndex::builtin().unwrap().into_table();
        table.table.title = "  ".into();
        assert!(TableIndex::build(table).is_err());

        let mut table = TableIndex::builtin().unwrap().into_table();
        table.table.supersedes.push(TableKey("game_support_v2".into()));
        let err = TableIndex::build(table).unwrap_err();
        assert!(err.to_string().contains("supersede itself"));
    }
}
