//! Registry of independent capability probes.
//!
//! The registry owns its host and an ordered list of probes. `evaluate()`
//! runs each probe once against the host and assembles a
//! [`CapabilityReport`]. A probe that errors, panics, or answers with the
//! wrong kind of value is recorded as the negative value of its declared
//! kind, so evaluation always produces a complete report.

use crate::catalog::{CapabilityCategory, CapabilityName, CapabilityTable, ValueKind};
use crate::host::HostEnvironment;
use crate::probe::{Probe, ProbeValue};
use crate::report::CapabilityReport;
use std::any::Any;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use thiserror::Error;
use tracing::{debug, warn};

/// Registered capability: where it is reported and how it is probed.
#[derive(Clone)]
pub struct Capability {
    pub category: CapabilityCategory,
    pub name: CapabilityName,
    probe: Arc<dyn Probe>,
}

impl Capability {
    pub fn kind(&self) -> ValueKind {
        self.probe.kind()
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("capability name in category {category} must not be empty")]
    EmptyName { category: String },
    #[error("capability name '{name}' in category {category} has surrounding whitespace")]
    PaddedName { category: String, name: String },
}

pub struct CapabilityRegistry<H> {
    host: H,
    capabilities: Vec<Capability>,
    latest: Option<CapabilityReport>,
}

impl<H: HostEnvironment> CapabilityRegistry<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            capabilities: Vec::new(),
            latest: None,
        }
    }

    /// Registry with one probe per table entry, in table order.
    pub fn from_table(table: &CapabilityTable, host: H) -> Self {
        let mut registry = Self::new(host);
        for entry in &table.capabilities {
            registry.insert(Capability {
                category: entry.category.clone().normalized(),
                name: entry.name.clone(),
                probe: Arc::new(entry.probe.clone()),
            });
        }
        registry
    }

    /// Add a probe, or silently replace the one already registered under
    /// `(category, name)`. A replaced probe keeps its original position.
    pub fn register<P>(
        &mut self,
        category: impl Into<CapabilityCategory>,
        name: &str,
        probe: P,
    ) -> Result<(), RegistryError>
    where
        P: Probe + 'static,
    {
        let category = category.into().normalized();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName {
                category: category.as_str().to_string(),
            });
        }
        if name.trim() != name {
            return Err(RegistryError::PaddedName {
                category: category.as_str().to_string(),
                name: name.to_string(),
            });
        }
        self.insert(Capability {
            category,
            name: CapabilityName::from(name),
            probe: Arc::new(probe),
        });
        Ok(())
    }

    fn insert(&mut self, capability: Capability) {
        match self
            .capabilities
            .iter_mut()
            .find(|existing| existing.category == capability.category && existing.name == capability.name)
        {
            Some(existing) => {
                debug!(
                    category = %capability.category,
                    name = %capability.name,
                    "replacing registered probe"
                );
                *existing = capability;
            }
            None => self.capabilities.push(capability),
        }
    }

    /// Run every probe once and record the report as the most recent one.
    pub fn evaluate(&mut self) -> CapabilityReport {
        let mut results: BTreeMap<CapabilityCategory, BTreeMap<CapabilityName, ProbeValue>> =
            BTreeMap::new();
        for capability in &self.capabilities {
            let value = run_probe(capability, &self.host);
            results
                .entry(capability.category.clone())
                .or_default()
                .insert(capability.name.clone(), value);
        }
        let report = CapabilityReport::from_results(results);
        debug!(capabilities = report.len(), "evaluated capability probes");
        self.latest = Some(report.clone());
        report
    }

    /// Whether the most recent report marks the capability as supported.
    ///
    /// False before the first evaluation and for unknown pairs.
    pub fn has(&self, category: &str, name: &str) -> bool {
        self.latest
            .as_ref()
            .map(|report| report.is_supported(category, name))
            .unwrap_or(false)
    }

    pub fn latest(&self) -> Option<&CapabilityReport> {
        self.latest.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access; later evaluations see the changes.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Registered capabilities in registration order.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

thread_local! {
    static PROBING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_PROBE_PANICS: Once = Once::new();

/// Chain a panic hook that stays silent for panics raised while this thread
/// runs a probe; those are reported through `run_probe` instead.
fn install_quiet_hook() {
    QUIET_PROBE_PANICS.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !PROBING.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn run_probe(capability: &Capability, host: &dyn HostEnvironment) -> ProbeValue {
    let kind = capability.kind();
    install_quiet_hook();
    PROBING.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| capability.probe.probe(host)));
    PROBING.with(|flag| flag.set(false));
    match outcome {
        Ok(Ok(value)) if value.kind() == kind => {
            debug!(
                category = %capability.category,
                name = %capability.name,
                %value,
                "probe result"
            );
            value
        }
        Ok(Ok(value)) => {
            warn!(
                category = %capability.category,
                name = %capability.name,
                expected = kind.as_str(),
                %value,
                "probe returned a value of the wrong kind"
            );
            kind.negative()
        }
        Ok(Err(err)) => {
            debug!(
                category = %capability.category,
                name = %capability.name,
                error = %err,
                "probe failed; recording negative result"
            );
            kind.negative()
        }
        Err(payload) => {
            warn!(
                category = %capability.category,
                name = %capability.name,
                panic = panic_message(payload.as_ref()),
                "probe panicked; recording negative result"
            );
            kind.negative()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
