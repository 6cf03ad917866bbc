//! AXIOM Sync - per-user collection synchronization
//!
//! Keeps named record collections in step with a remote per-user store:
//! - Plain in-memory state while no owner is signed in
//! - One load per owner, with stale results from earlier owners discarded
//! - One-time migration of legacy local data into an empty remote store
//! - Debounced saves after a quiet period
//! - Local fallback when the remote store fails
//!
//! # Example
//!
//! ```rust,ignore
//! use axiom_sync::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), SyncError> {
//! let ctx = SyncContext::new(
//!     Arc::new(MemoryRemoteStore::new()),
//!     Arc::new(MemoryLocalStore::new()),
//! );
//! let notes = Arc::new(ctx.collection::<serde_json::Value>(NOTES, vec![])?);
//!
//! let session = Session::new();
//! notes.follow(session.subscribe());
//! session.sign_in(OwnerId::new("user-1").unwrap());
//!
//! notes.settled().await;
//! notes.update(|v| v.push(serde_json::json!({"id": "note-1"})));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod backup;
pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod local;
pub mod registry;
pub mod remote;

pub use backup::{backup_file_name, clear_local, export_backup, import_backup, Backup, BACKUP_VERSION};
pub use collection::{Record, RecordList, SyncFailure, SyncStage, SyncStats, SyncStatus, SyncedCollection};
pub use config::{SyncConfig, DEFAULT_DEBOUNCE_MS};
pub use context::SyncContext;
pub use error::{ParseError, StoreError, SyncError, TransportError, TransportErrorKind};
pub use identity::{OwnerId, Session};
pub use local::{FileLocalStore, LocalCollection, LocalStore, MemoryLocalStore};
pub use registry::{CollectionRegistry, CollectionSpec, IDEAS, NOTES};
pub use remote::{MemoryRemoteStore, RemoteStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with AXIOM Sync
    pub use crate::{
        CollectionRegistry, CollectionSpec, LocalCollection, LocalStore, MemoryLocalStore,
        MemoryRemoteStore, OwnerId, RemoteStore, Session, SyncConfig, SyncContext, SyncError,
        SyncStatus, SyncedCollection, IDEAS, NOTES,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
