//! Host described by a JSON profile.
//!
//! A profile lists which bindings exist, the integer values some of them
//! carry, which constructors succeed, and which canvas contexts are
//! available. Anything not listed is absent. Profiles are how the probes are
//! exercised outside a browser, and they double as recorded fixtures of real
//! hosts.

use crate::host::HostEnvironment;
use crate::probe::ProbeError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileHost {
    pub name: String,
    #[serde(default)]
    pub bindings: BTreeSet<String>,
    #[serde(default)]
    pub integers: BTreeMap<String, i64>,
    #[serde(default)]
    pub constructible: BTreeSet<String>,
    #[serde(default)]
    pub canvas_contexts: BTreeSet<String>,
}

impl ProfileHost {
    /// Empty host: every probe against it reports the negative value.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Read a profile from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading host profile {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("parsing host profile {}", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let profile: ProfileHost = serde_json::from_str(data)?;
        Ok(profile)
    }

    pub fn with_binding(mut self, path: impl Into<String>) -> Self {
        self.bindings.insert(path.into());
        self
    }

    pub fn with_integer(mut self, path: impl Into<String>, value: i64) -> Self {
        self.integers.insert(path.into(), value);
        self
    }

    pub fn with_constructor(mut self, constructor: impl Into<String>) -> Self {
        self.constructible.insert(constructor.into());
        self
    }

    pub fn with_canvas_context(mut self, context_id: impl Into<String>) -> Self {
        self.canvas_contexts.insert(context_id.into());
        self
    }

    /// Add a binding in place, e.g. after a simulated permission grant.
    pub fn insert_binding(&mut self, path: impl Into<String>) {
        self.bindings.insert(path.into());
    }

    /// Remove a binding or integer in place.
    pub fn remove_binding(&mut self, path: &str) {
        self.bindings.remove(path);
        self.integers.remove(path);
    }
}

impl HostEnvironment for ProfileHost {
    fn has_binding(&self, path: &str) -> bool {
        self.bindings.contains(path) || self.integers.contains_key(path)
    }

    fn integer(&self, path: &str) -> Option<i64> {
        self.integers.get(path).copied()
    }

    fn construct(&self, constructor: &str) -> Result<(), ProbeError> {
        if self.constructible.contains(constructor) {
            Ok(())
        } else {
            Err(ProbeError::construction(
                constructor,
                format!("not constructible in host profile '{}'", self.name),
            ))
        }
    }

    fn canvas_context(&self, context_id: &str) -> Result<bool, ProbeError> {
        Ok(self.canvas_contexts.contains(context_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn integers_count_as_bindings() {
        let host = ProfileHost::named("cores").with_integer("navigator.hardwareConcurrency", 4);
        assert!(host.has_binding("navigator.hardwareConcurrency"));
        assert_eq!(host.integer("navigator.hardwareConcurrency"), Some(4));
        assert!(!host.has_binding("navigator.deviceMemory"));
    }

    #[test]
    fn unlisted_constructor_fails() {
        let host = ProfileHost::named("bare").with_constructor("Blob");
        assert!(host.construct("Blob").is_ok());
        let err = host.construct("KeyboardEvent").unwrap_err();
        assert!(matches!(err, ProbeError::Construction { ref constructor, .. } if constructor == "KeyboardEvent"));
    }

    #[test]
    fn load_reads_profile_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        serde_json::to_writer(
            &mut file,
            &serde_json::json!({
                "name": "fixture",
                "bindings": ["window.WebSocket"],
                "integers": {"navigator.hardwareConcurrency": 2},
                "canvas_contexts": ["2d"]
            }),
        )
        .unwrap();

        let host = ProfileHost::load(file.path()).unwrap();
        assert_eq!(host.name, "fixture");
        assert!(host.has_binding("window.WebSocket"));
        assert_eq!(host.canvas_context("2d"), Ok(true));
        assert_eq!(host.canvas_context("webgl"), Ok(false));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let err = ProfileHost::from_json(r#"{"name": "x", "globals": []}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn remove_binding_drops_integers_too() {
        let mut host = ProfileHost::named("mutable")
            .with_binding("window.Worker")
            .with_integer("navigator.hardwareConcurrency", 8);
        host.remove_binding("navigator.hardwareConcurrency");
        host.remove_binding("window.Worker");
        assert!(!host.has_binding("window.Worker"));
        assert_eq!(host.integer("navigator.hardwareConcurrency"), None);
    }
}
