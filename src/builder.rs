//! Store builder and registry.
//!
//! [`StoreRegistry`] issues the `runtime://<n>` URIs that identify stores.
//! [`StoreBuilder`] validates a [`Config`] and creates stores from it,
//! optionally numbering them through a caller-owned registry.

use crate::config::Config;
use crate::db::RuntimeFeatureStore;
use crate::error::{Result, StoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// URI scheme of in-memory stores.
pub const URI_SCHEME: &str = "runtime://";

static DEFAULT_REGISTRY: StoreRegistry = StoreRegistry::new();

/// Issues store URIs from its own instance counter.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    issued: AtomicU64,
}

impl StoreRegistry {
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
        }
    }

    /// Registry used by stores built without an explicit one.
    pub fn global() -> &'static StoreRegistry {
        &DEFAULT_REGISTRY
    }

    /// Number of URIs issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    pub(crate) fn next_uri(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", URI_SCHEME, n)
    }
}

/// Builder for store configuration.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    config: Config,
    registry: Option<Arc<StoreRegistry>>,
}

impl StoreBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store configuration (quadtree shape, lock timeout).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Number the store through `registry` instead of the global one.
    pub fn registry(mut self, registry: Arc<StoreRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the store. Fails with `InvalidArgument` if the configuration
    /// does not validate.
    pub fn build(self) -> Result<RuntimeFeatureStore> {
        self.config.validate().map_err(StoreError::InvalidArgument)?;

        let uri = match &self.registry {
            Some(registry) => registry.next_uri(),
            None => StoreRegistry::global().next_uri(),
        };
        Ok(RuntimeFeatureStore::from_parts(uri, &self.config))
    }
}
