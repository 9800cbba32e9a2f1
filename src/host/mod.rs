//! Host environments the probes inspect.
//!
//! Probes never touch ambient globals directly; they ask a [`HostEnvironment`]
//! injected into the registry. `ProfileHost` answers from a JSON description
//! and is what tests and the CLI use. On `wasm32` the `BrowserHost` in
//! `crate::browser` answers from the live JavaScript global object.

mod profile;

pub use profile::ProfileHost;

use crate::probe::ProbeError;

/// Read-only view of the ambient bindings of a host runtime.
///
/// Paths are dotted: the first segment names a root object (`window`,
/// `navigator`, `document`, `screen`, `Math`, `ArrayBuffer`, `element`) and
/// the rest name properties below it.
pub trait HostEnvironment {
    /// True when the last segment is a property present on its (non-null)
    /// parent, the same test as JavaScript's `in` operator.
    fn has_binding(&self, path: &str) -> bool;

    /// Integer value of a binding, when present and numeric.
    fn integer(&self, path: &str) -> Option<i64>;

    /// Attempt a throwaway construction of `constructor` with no arguments.
    fn construct(&self, constructor: &str) -> Result<(), ProbeError>;

    /// Whether a scratch canvas yields a non-null rendering context for `context_id`.
    fn canvas_context(&self, context_id: &str) -> Result<bool, ProbeError>;
}

/// Split a binding path into its root object and member chain.
pub fn split_path(path: &str) -> (&str, Vec<&str>) {
    let mut segments = path.split('.').filter(|segment| !segment.is_empty());
    let root = segments.next().unwrap_or_default();
    (root, segments.collect())
}

/// Returns true when `path` is a dotted chain of identifiers.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || matches!(first, '_' | '$') => chars
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$')),
                _ => false,
            }
        })
}
