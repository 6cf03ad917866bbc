//! Shared wiring for building collections

use crate::collection::{Record, SyncedCollection};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::local::{LocalCollection, LocalStore};
use crate::registry::CollectionRegistry;
use crate::remote::RemoteStore;
use std::sync::Arc;

/// Stores, registry, and configuration shared by every collection
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Remote document store
    pub remote: Arc<dyn RemoteStore>,
    /// Local key/value store
    pub local: Arc<dyn LocalStore>,
    /// Known collections
    pub registry: CollectionRegistry,
    /// Sync configuration
    pub config: SyncConfig,
}

impl SyncContext {
    /// Create context with the standard registry and default config
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            remote,
            local,
            registry: CollectionRegistry::standard(),
            config: SyncConfig::default(),
        }
    }

    /// With registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: CollectionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// With config
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a synced collection for a registered name
    ///
    /// # Errors
    /// `SyncError::UnknownCollection` if `name` is not registered
    pub fn collection<T: Record>(
        &self,
        name: &str,
        default: Vec<T>,
    ) -> Result<SyncedCollection<T>, SyncError> {
        let spec = self.registry.get(name)?.clone();
        Ok(SyncedCollection::new(
            spec,
            default,
            Arc::clone(&self.remote),
            Arc::clone(&self.local),
            self.config.clone(),
        ))
    }

    /// Build a local-only collection for a registered name
    ///
    /// # Errors
    /// `SyncError::UnknownCollection` if `name` is not registered
    pub fn local_collection<T: Record>(
        &self,
        name: &str,
        default: Vec<T>,
    ) -> Result<LocalCollection<T>, SyncError> {
        let spec = self.registry.get(name)?;
        Ok(LocalCollection::open(
            spec.legacy_key.clone(),
            default,
            Arc::clone(&self.local),
        ))
    }
}
