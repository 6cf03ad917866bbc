//! Local key/value store and local-only collections
//!
//! The local store is synchronous string persistence. Signed-in collections
//! read it once, as a migration source; signed-out usage persists through
//! [`LocalCollection`] on every change.

use crate::collection::RecordList;
use crate::error::{ParseError, StoreError};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Synchronous string key/value store
pub trait LocalStore: Send + Sync + Debug {
    /// Read raw text under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Write raw text under `key`
    ///
    /// # Errors
    /// `StoreError` if the backing medium cannot be written
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key is not an error
    ///
    /// # Errors
    /// `StoreError` if the backing medium cannot be written
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Decode the records stored under `key`
///
/// Returns `Ok(None)` when nothing is stored.
pub(crate) fn read_records<T: DeserializeOwned>(
    store: &dyn LocalStore,
    key: &str,
) -> Result<Option<Vec<T>>, ParseError> {
    match store.get(key) {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ParseError::Local {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// In-process local store
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryLocalStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding one entry
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.write().insert(key.into(), value.into());
        store
    }

    /// Keys currently stored
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Local store backed by a JSON object file
///
/// The whole file is read at open and rewritten (temp file, then rename) on
/// every mutation.
#[derive(Debug)]
pub struct FileLocalStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileLocalStore {
    /// Open the store, starting empty if the file does not exist
    ///
    /// # Errors
    /// - `StoreError::Io` if the file exists but cannot be read
    /// - `StoreError::Corrupt` if it is not a JSON object of strings
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::io_error(&path, e)),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened local store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, text).map_err(|e| StoreError::io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io_error(&self.path, e))
    }
}

impl LocalStore for FileLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Collection persisted only to the local store
///
/// Initialized from the stored value (or the default if absent or
/// malformed) and written back after every change.
#[derive(Debug)]
pub struct LocalCollection<T> {
    key: String,
    store: Arc<dyn LocalStore>,
    value: RwLock<Vec<T>>,
}

impl<T> LocalCollection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Open collection under `key`
    pub fn open(key: impl Into<String>, default: Vec<T>, store: Arc<dyn LocalStore>) -> Self {
        let key = key.into();

        let value = match read_records(store.as_ref(), &key) {
            Ok(Some(records)) => records,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring malformed local data");
                default
            }
        };

        Self {
            key,
            store,
            value: RwLock::new(value),
        }
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> Vec<T> {
        self.value.read().clone()
    }

    /// Replace the value
    pub fn set(&self, value: Vec<T>) {
        let mut guard = self.value.write();
        *guard = value;
        self.persist(&guard);
    }

    /// Mutate the value in place
    pub fn update(&self, f: impl FnOnce(&mut Vec<T>)) {
        let mut guard = self.value.write();
        f(&mut guard);
        self.persist(&guard);
    }

    /// Storage key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn persist(&self, value: &[T]) {
        let result = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|text| self.store.set(&self.key, &text).map_err(|e| e.to_string()));

        if let Err(error) = result {
            tracing::error!(key = %self.key, %error, "failed to persist local collection");
        }
    }
}

impl<T> RecordList<T> for LocalCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    fn get(&self) -> Vec<T> {
        LocalCollection::get(self)
    }

    fn update<F: FnOnce(&mut Vec<T>)>(&self, f: F) {
        LocalCollection::update(self, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryLocalStore::new();
        assert!(store.get("k").is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
    }

    #[test]
    fn read_records_reports_malformed_text() {
        let store = MemoryLocalStore::with_entry("axiom_notes", "not json");
        let err = read_records::<u32>(&store, "axiom_notes").unwrap_err();
        assert!(matches!(err, ParseError::Local { key, .. } if key == "axiom_notes"));

        assert!(read_records::<u32>(&store, "missing").unwrap().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileLocalStore::open(&path).unwrap();
        store.set("axiom_notes", "[1,2,3]").unwrap();
        drop(store);

        let reopened = FileLocalStore::open(&path).unwrap();
        assert_eq!(reopened.get("axiom_notes").as_deref(), Some("[1,2,3]"));

        reopened.remove("axiom_notes").unwrap();
        let again = FileLocalStore::open(&path).unwrap();
        assert!(again.get("axiom_notes").is_none());
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = FileLocalStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn local_collection_loads_and_persists() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::with_entry("nums", "[1,2]"));
        let collection = LocalCollection::<u32>::open("nums", vec![], store.clone());
        assert_eq!(collection.get(), vec![1, 2]);

        collection.update(|v| v.push(3));
        assert_eq!(store.get("nums").as_deref(), Some("[1,2,3]"));

        collection.set(vec![9]);
        assert_eq!(store.get("nums").as_deref(), Some("[9]"));
    }

    fn push_twice<L: RecordList<u32>>(list: &L, value: u32) {
        list.update(|v| v.extend([value, value]));
    }

    #[test]
    fn local_collection_edits_through_record_list() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
        let collection = LocalCollection::<u32>::open("nums", vec![], store.clone());
        push_twice(&collection, 4);

        assert_eq!(RecordList::get(&collection), vec![4, 4]);
        assert_eq!(store.get("nums").as_deref(), Some("[4,4]"));
    }

    #[test]
    fn local_collection_falls_back_to_default_on_bad_data() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::with_entry("nums", "{oops"));
        let collection = LocalCollection::<u32>::open("nums", vec![7], store);
        assert_eq!(collection.get(), vec![7]);
    }
}
