//! Collection registry
//!
//! Maps each logical collection name to where it lives: the name remote
//! stores address it by, the legacy local key it migrates from, and its
//! field in a backup file.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the notes collection
pub const NOTES: &str = "notes";
/// Name of the completed ideas collection
pub const IDEAS: &str = "ideas";

/// Storage locations of one logical collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Logical collection name
    pub name: String,
    /// Key under which the legacy local store kept this collection
    pub legacy_key: String,
    /// Field name used in backup files
    pub backup_field: String,
}

impl CollectionSpec {
    /// Create spec; the backup field defaults to the collection name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, legacy_key: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            backup_field: name.clone(),
            name,
            legacy_key: legacy_key.into(),
        }
    }

    /// With backup field name
    #[inline]
    #[must_use]
    pub fn with_backup_field(mut self, field: impl Into<String>) -> Self {
        self.backup_field = field.into();
        self
    }
}

/// Table of known collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionRegistry {
    specs: BTreeMap<String, CollectionSpec>,
}

impl CollectionRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the notes and ideas collections
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(CollectionSpec::new(NOTES, "axiom_notes"));
        registry.register(
            CollectionSpec::new(IDEAS, "axiom_completed_ideas").with_backup_field("completedIdeas"),
        );
        registry
    }

    /// Register or replace a collection
    pub fn register(&mut self, spec: CollectionSpec) {
        self.specs.insert(spec.name.clone(), spec);
    }

    /// Look up a collection
    ///
    /// # Errors
    /// `SyncError::UnknownCollection` if `name` was never registered
    pub fn get(&self, name: &str) -> Result<&CollectionSpec, SyncError> {
        self.specs
            .get(name)
            .ok_or_else(|| SyncError::UnknownCollection(name.to_string()))
    }

    /// Iterate over registered collections in name order
    pub fn iter(&self) -> impl Iterator<Item = &CollectionSpec> {
        self.specs.values()
    }

    /// Number of registered collections
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
