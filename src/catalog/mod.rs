//! Capability table wiring.
//!
//! This module wraps the JSON table under `catalogs/game_support.json` so
//! callers can load a validated table and build a registry from it. Types
//! here mirror the schema fields; callers use `TableIndex` for validated
//! lookups and `CapabilityTable` for the raw surface.

pub mod identity;
pub mod index;
pub mod model;

pub use identity::{CapabilityCategory, CapabilityName, TableKey, ValueKind};
pub use index::{TABLE_SCHEMA_VERSION, TableIndex};
pub use model::{
    BUILTIN_TABLE_JSON, CapabilityEntry, CapabilityTable, ProbeStrategy, TableInfo,
    load_table_from_path,
};
