//! Snapshot produced by one evaluation of a capability registry.
//!
//! The report serializes as `{category: {name: value}}`. Category and
//! capability names are the public contract downstream code branches on.

use crate::catalog::{CapabilityCategory, CapabilityName};
use crate::probe::ProbeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityReport {
    results: BTreeMap<CapabilityCategory, BTreeMap<CapabilityName, ProbeValue>>,
}

impl CapabilityReport {
    pub(crate) fn from_results(
        results: BTreeMap<CapabilityCategory, BTreeMap<CapabilityName, ProbeValue>>,
    ) -> Self {
        Self { results }
    }

    /// Value recorded for a capability, if it was evaluated.
    pub fn get(&self, category: &str, name: &str) -> Option<ProbeValue> {
        self.results
            .get(&CapabilityCategory::from_name(category))?
            .get(&CapabilityName::from(name))
            .copied()
    }

    /// True flag or known positive count; false for anything unknown.
    pub fn is_supported(&self, category: &str, name: &str) -> bool {
        self.get(category, name)
            .map(|value| value.is_supported())
            .unwrap_or(false)
    }

    pub fn categories(&self) -> impl Iterator<Item = &CapabilityCategory> {
        self.results.keys()
    }

    /// Capabilities recorded under `category`, in name order.
    pub fn capabilities(
        &self,
        category: &CapabilityCategory,
    ) -> impl Iterator<Item = (&CapabilityName, &ProbeValue)> {
        self.results.get(category).into_iter().flatten()
    }

    /// Total number of recorded capabilities across categories.
    pub fn len(&self) -> usize {
        self.results.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single-level `{name: value}` view matching the legacy probe object.
    ///
    /// A name present in several categories keeps the value from the last
    /// category in report order.
    pub fn flatten(&self) -> BTreeMap<CapabilityName, ProbeValue> {
        let mut flat = BTreeMap::new();
        for values in self.results.values() {
            for (name, value) in values {
                flat.insert(name.clone(), *value);
            }
        }
        flat
    }

    /// Support lookup by bare capability name, resolved against
    /// [`flatten`](Self::flatten) like the legacy `gameSupport.has(key)`.
    pub fn has_flat(&self, name: &str) -> bool {
        self.flatten()
            .get(&CapabilityName::from(name))
            .is_some_and(ProbeValue::is_supported)
    }
}
