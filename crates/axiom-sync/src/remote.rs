//! Remote document store contract
//!
//! One JSON array per owner per collection. Records are moved as
//! `serde_json::Value`s; typed decoding happens in the collection.

use crate::error::TransportError;
use crate::identity::OwnerId;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

/// Remote per-user document store
#[async_trait]
pub trait RemoteStore: Send + Sync + std::fmt::Debug {
    /// Fetch the stored records, `None` if the document does not exist
    ///
    /// # Errors
    /// `TransportError` on network or permission failure
    async fn get(&self, owner: &OwnerId, collection: &str)
        -> Result<Option<Vec<Value>>, TransportError>;

    /// Replace the stored records
    ///
    /// # Errors
    /// `TransportError` on network or permission failure
    async fn save(
        &self,
        owner: &OwnerId,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<(), TransportError>;
}

/// In-process remote store
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    documents: DashMap<(OwnerId, String), Vec<Value>>,
}

impl MemoryRemoteStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly
    pub fn insert(&self, owner: &OwnerId, collection: &str, records: Vec<Value>) {
        self.documents
            .insert((owner.clone(), collection.to_string()), records);
    }

    /// Read a document without going through the async contract
    #[must_use]
    pub fn snapshot(&self, owner: &OwnerId, collection: &str) -> Option<Vec<Value>> {
        self.documents
            .get(&(owner.clone(), collection.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn get(
        &self,
        owner: &OwnerId,
        collection: &str,
    ) -> Result<Option<Vec<Value>>, TransportError> {
        Ok(self.snapshot(owner, collection))
    }

    async fn save(
        &self,
        owner: &OwnerId,
        collection: &str,
        records: Vec<Value>,
    ) -> Result<(), TransportError> {
        self.insert(owner, collection, records);
        Ok(())
    }
}
