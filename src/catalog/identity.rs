use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Versioned key for a capability table (e.g., `game_support_v2`).
///
/// Bumped whenever a category or capability name changes, because downstream
/// code branches on those keys.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableKey(pub String);

/// Name of an individual capability inside its category.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(pub String);

impl CapabilityName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CapabilityName {
    fn from(value: &str) -> Self {
        CapabilityName(value.to_string())
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grouping under which capabilities are reported.
///
/// Known variants keep serialization consistent; `Other` preserves forward
/// compatibility with tables that introduce new categories.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CapabilityCategory {
    Storage,
    Graphics,
    Audio,
    Networking,
    Input,
    Experience,
    Performance,
    Other(String),
}

/// Declared result type of a probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Flag,
    Count,
}

impl Serialize for CapabilityCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CapabilityCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_name(&value))
    }
}

impl CapabilityCategory {
    pub fn as_str(&self) -> &str {
        match self {
            CapabilityCategory::Storage => "storage",
            CapabilityCategory::Graphics => "graphics",
            CapabilityCategory::Audio => "audio",
            CapabilityCategory::Networking => "networking",
            CapabilityCategory::Input => "input",
            CapabilityCategory::Experience => "experience",
            CapabilityCategory::Performance => "performance",
            CapabilityCategory::Other(value) => value.as_str(),
        }
    }

    pub fn from_name(value: &str) -> Self {
        match value {
            "storage" => CapabilityCategory::Storage,
            "graphics" => CapabilityCategory::Graphics,
            "audio" => CapabilityCategory::Audio,
            "networking" => CapabilityCategory::Networking,
            "input" => CapabilityCategory::Input,
            "experience" => CapabilityCategory::Experience,
            "performance" => CapabilityCategory::Performance,
            other => CapabilityCategory::Other(other.to_string()),
        }
    }

    /// Fold an `Other` that spells a known category into that variant, so
    /// equal names always compare (and serialize) as one map key.
    pub fn normalized(self) -> Self {
        match self {
            CapabilityCategory::Other(name) => Self::from_name(&name),
            known => known,
        }
    }
}

impl From<&str> for CapabilityCategory {
    fn from(value: &str) -> Self {
        Self::from_name(value)
    }
}

impl fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_known_and_unknown() {
        let known = CapabilityCategory::Networking;
        let json = serde_json::to_string(&known).unwrap();
        assert_eq!(json, "\"networking\"");
        let back: CapabilityCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, known);

        let parsed: CapabilityCategory = serde_json::from_str("\"xr\"").unwrap();
        assert_eq!(parsed, CapabilityCategory::Other("xr".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"xr\"");
    }

    #[test]
    fn category_works_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(CapabilityCategory::Graphics, 1);
        map.insert(CapabilityCategory::Other("xr".into()), 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"graphics":1,"xr":2}"#);
        let back: std::collections::BTreeMap<CapabilityCategory, i32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn other_spelling_a_known_category_normalizes() {
        assert_eq!(
            CapabilityCategory::Other("graphics".into()).normalized(),
            CapabilityCategory::Graphics
        );
        assert_eq!(
            CapabilityCategory::Other("xr".into()).normalized(),
            CapabilityCategory::Other("xr".into())
        );
        assert_eq!(CapabilityCategory::Audio.normalized(), CapabilityCategory::Audio);
    }

    #[test]
    fn value_kind_uses_snake_case() {
        assert_eq!(serde_json::to_string(&ValueKind::Count).unwrap(), "\"count\"");
        let kind: ValueKind = serde_json::from_str("\"flag\"").unwrap();
        assert_eq!(kind, ValueKind::Flag);
    }
}
