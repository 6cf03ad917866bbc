//! Local data backup
//!
//! Backup files hold the raw local-store text of every registered collection
//! under its backup field, plus `exportDate` and `version`:
//!
//! ```json
//! {
//!   "notes": "[{\"id\":\"note-1\", ...}]",
//!   "completedIdeas": null,
//!   "exportDate": "2024-05-01T10:00:00Z",
//!   "version": "1.0"
//! }
//! ```

use crate::error::SyncError;
use crate::local::LocalStore;
use crate::registry::CollectionRegistry;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Backup format version
pub const BACKUP_VERSION: &str = "1.0";

/// Snapshot of the local store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Raw stored text per backup field; `null` when nothing was stored
    #[serde(flatten)]
    pub collections: BTreeMap<String, Value>,
    /// When the backup was taken
    pub export_date: DateTime<Utc>,
    /// Format version
    pub version: String,
}

impl Backup {
    /// Render as pretty-printed JSON
    ///
    /// # Errors
    /// `SyncError::Backup` if serialization fails
    pub fn to_json(&self) -> Result<String, SyncError> {
        serde_json::to_string_pretty(self).map_err(SyncError::Backup)
    }

    /// Parse a backup file
    ///
    /// # Errors
    /// `SyncError::Backup` if `text` is not a backup document
    pub fn from_json(text: &str) -> Result<Self, SyncError> {
        serde_json::from_str(text).map_err(SyncError::Backup)
    }

    /// Raw text stored for a backup field
    ///
    /// Non-string values are accepted as already-decoded JSON and re-encoded.
    #[must_use]
    pub fn field_text(&self, field: &str) -> Option<String> {
        match self.collections.get(field)? {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Snapshot every registered collection from the local store
#[must_use]
pub fn export_backup(
    registry: &CollectionRegistry,
    local: &dyn LocalStore,
    now: DateTime<Utc>,
) -> Backup {
    let collections = registry
        .iter()
        .map(|spec| {
            let text = local.get(&spec.legacy_key).map_or(Value::Null, Value::String);
            (spec.backup_field.clone(), text)
        })
        .collect();

    Backup {
        collections,
        export_date: now,
        version: BACKUP_VERSION.to_string(),
    }
}

/// Write the fields present in `backup` back to the local store
///
/// Collections missing from the backup are left untouched. Returns the
/// number of collections written.
///
/// # Errors
/// `SyncError::Store` if the local store cannot be written
pub fn import_backup(
    registry: &CollectionRegistry,
    local: &dyn LocalStore,
    backup: &Backup,
) -> Result<usize, SyncError> {
    if backup.version != BACKUP_VERSION {
        tracing::warn!(version = %backup.version, "importing backup with unexpected version");
    }

    let mut written = 0;
    for spec in registry.iter() {
        if let Some(text) = backup.field_text(&spec.backup_field) {
            local.set(&spec.legacy_key, &text)?;
            written += 1;
        }
    }

    tracing::info!(written, exported = %backup.export_date, "imported backup");
    Ok(written)
}

/// Remove every registered collection from the local store
///
/// # Errors
/// `SyncError::Store` on the first key that cannot be removed
pub fn clear_local(registry: &CollectionRegistry, local: &dyn LocalStore) -> Result<(), SyncError> {
    for spec in registry.iter() {
        local.remove(&spec.legacy_key)?;
    }
    tracing::info!(collections = registry.len(), "cleared local data");
    Ok(())
}

/// Backup file name for a date, `axiom-backup-YYYY-MM-DD.json`
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("axiom-backup-{}.json", date.format("%Y-%m-%d"))
}
