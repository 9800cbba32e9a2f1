//! Probe contract: what a capability check returns and how it may fail.
//!
//! A probe inspects the injected [`HostEnvironment`] and answers with a
//! [`ProbeValue`] of its declared [`ValueKind`]. Failures are typed as
//! [`ProbeError`] so hosts can describe them, but the registry never lets one
//! escape `evaluate()`; they are folded into the negative value of the kind.

use crate::catalog::ValueKind;
use crate::host::HostEnvironment;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sentinel reported by count probes when the host does not expose a value.
pub const UNKNOWN_COUNT: i64 = -1;

/// Result of a single probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbeValue {
    Flag(bool),
    Count(i64),
}

impl ProbeValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ProbeValue::Flag(_) => ValueKind::Flag,
            ProbeValue::Count(_) => ValueKind::Count,
        }
    }

    /// Whether the value means "supported": a true flag or a known positive count.
    pub fn is_supported(&self) -> bool {
        match self {
            ProbeValue::Flag(value) => *value,
            ProbeValue::Count(value) => *value > 0,
        }
    }
}

impl fmt::Display for ProbeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeValue::Flag(value) => write!(f, "{value}"),
            ProbeValue::Count(value) => write!(f, "{value}"),
        }
    }
}

impl ValueKind {
    /// Value recorded when a probe of this kind faults or finds nothing.
    pub fn negative(self) -> ProbeValue {
        match self {
            ValueKind::Flag => ProbeValue::Flag(false),
            ValueKind::Count => ProbeValue::Count(UNKNOWN_COUNT),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Flag => "flag",
            ValueKind::Count => "count",
        }
    }
}

/// Why a probe could not produce a value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// Trial construction of a host object failed.
    #[error("constructing {constructor} failed: {reason}")]
    Construction { constructor: String, reason: String },
    /// The host could not answer the query at all.
    #[error("host query failed: {0}")]
    Host(String),
}

impl ProbeError {
    pub fn construction(constructor: impl Into<String>, reason: impl Into<String>) -> Self {
        ProbeError::Construction {
            constructor: constructor.into(),
            reason: reason.into(),
        }
    }
}

/// A capability check run against a host.
///
/// Implementations must not block, retry, or consult other probes.
pub trait Probe: Send + Sync {
    /// Kind of value this probe reports.
    fn kind(&self) -> ValueKind;

    fn probe(&self, host: &dyn HostEnvironment) -> Result<ProbeValue, ProbeError>;
}

/// Probe backed by a closure.
pub struct FnProbe<F> {
    kind: ValueKind,
    check: F,
}

impl<F> FnProbe<F>
where
    F: Fn(&dyn HostEnvironment) -> Result<ProbeValue, ProbeError> + Send + Sync,
{
    /// Wrap a fallible closure that declares `kind`.
    pub fn new(kind: ValueKind, check: F) -> Self {
        Self { kind, check }
    }
}

impl<F> Probe for FnProbe<F>
where
    F: Fn(&dyn HostEnvironment) -> Result<ProbeValue, ProbeError> + Send + Sync,
{
    fn kind(&self) -> ValueKind {
        self.kind
    }

    fn probe(&self, host: &dyn HostEnvironment) -> Result<ProbeValue, ProbeError> {
        (self.check)(host)
    }
}

/// Infallible boolean probe.
pub fn flag_probe<F>(check: F) -> impl Probe
where
    F: Fn(&dyn HostEnvironment) -> bool + Send + Sync,
{
    FnProbe::new(ValueKind::Flag, move |host: &dyn HostEnvironment| {
        Ok(ProbeValue::Flag(check(host)))
    })
}

/// Integer probe; `None` is reported as [`UNKNOWN_COUNT`].
pub fn count_probe<F>(check: F) -> impl Probe
where
    F: Fn(&dyn HostEnvironment) -> Option<i64> + Send + Sync,
{
    FnProbe::new(ValueKind::Count, move |host: &dyn HostEnvironment| {
        Ok(ProbeValue::Count(check(host).unwrap_or(UNKNOWN_COUNT)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ProfileHost;

    #[test]
    fn values_serialize_as_bare_json() {
        assert_eq!(serde_json::to_string(&ProbeValue::Flag(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&ProbeValue::Count(-1)).unwrap(), "-1");
        let parsed: ProbeValue = serde_json::from_str("8").unwrap();
        assert_eq!(parsed, ProbeValue::Count(8));
        let parsed: ProbeValue = serde_json::from_str("false").unwrap();
        assert_eq!(parsed, ProbeValue::Flag(false));
    }

    #[test]
    fn negative_values_per_kind() {
        assert_eq!(ValueKind::Flag.negative(), ProbeValue::Flag(false));
        assert_eq!(ValueKind::Count.negative(), ProbeValue::Count(UNKNOWN_COUNT));
        assert!(!ValueKind::Count.negative().is_supported());
        assert!(!ProbeValue::Count(0).is_supported());
        assert!(ProbeValue::Count(4).is_supported());
    }

    #[test]
    fn count_probe_maps_missing_value_to_sentinel() {
        let host = ProfileHost::named("empty");
        let probe = count_probe(|host| host.integer("navigator.hardwareConcurrency"));
        assert_eq!(probe.kind(), ValueKind::Count);
        assert_eq!(probe.probe(&host), Ok(ProbeValue::Count(-1)));

        let host = host.with_integer("navigator.hardwareConcurrency", 12);
        assert_eq!(probe.probe(&host), Ok(ProbeValue::Count(12)));
    }

    #[test]
    fn construction_error_message_names_constructor() {
        let err = ProbeError::construction("Blob", "Illegal constructor");
        assert_eq!(err.to_string(), "constructing Blob failed: Illegal constructor");
    }
}
