//! Read-mostly configuration snapshots
//!
//! The process-wide default ComponentConfig, context policy tables, and
//! child-keyword list live behind an atomically-swappable snapshot. Readers
//! clone the `Arc` once at request start and complete on that snapshot;
//! administrative updates replace the whole snapshot without touching
//! in-flight requests.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use imageguard_analyzers::description::{KeywordScanner, DEFAULT_CHILD_KEYWORDS};
use imageguard_core::{ComponentConfig, Result};
use imageguard_policy::ContextPolicySet;

/// Administrative defaults for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Default component toggles applied when a request carries no override
    #[serde(default)]
    pub component_config: ComponentConfig,

    /// Context threshold tables
    #[serde(default)]
    pub policies: ContextPolicySet,

    /// Child-content keyword list
    #[serde(default = "default_child_keywords")]
    pub child_keywords: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            component_config: ComponentConfig::default(),
            policies: ContextPolicySet::builtin(),
            child_keywords: default_child_keywords(),
        }
    }
}

fn default_child_keywords() -> Vec<String> {
    DEFAULT_CHILD_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// A validated, immutable snapshot derived from [`Defaults`].
///
/// The keyword scanner automaton is built once here so the request path
/// never pays construction or validation costs.
pub struct Snapshot {
    pub component_config: ComponentConfig,
    pub policies: ContextPolicySet,
    pub scanner: KeywordScanner,
}

impl Snapshot {
    /// Build and validate a snapshot
    pub fn build(defaults: Defaults) -> Result<Self> {
        defaults.policies.validate()?;
        let scanner = KeywordScanner::new(defaults.child_keywords)?;

        Ok(Self {
            component_config: defaults.component_config,
            policies: defaults.policies,
            scanner,
        })
    }
}

/// Atomically-swappable snapshot store
pub struct SnapshotStore {
    inner: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Create a store from administrative defaults
    pub fn new(defaults: Defaults) -> Result<Self> {
        Ok(Self {
            inner: RwLock::new(Arc::new(Snapshot::build(defaults)?)),
        })
    }

    /// Get the current snapshot. The returned `Arc` stays valid for the
    /// whole request even if the store is replaced mid-flight.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().clone()
    }

    /// Replace the snapshot atomically. Validation failures leave the
    /// current snapshot untouched.
    pub fn replace(&self, defaults: Defaults) -> Result<()> {
        let snapshot = Arc::new(Snapshot::build(defaults)?);
        *self.inner.write() = snapshot;
        info!("configuration snapshot replaced");
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Defaults::default()).expect("built-in defaults are valid")
    }
}
