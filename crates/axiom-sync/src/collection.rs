//! Synced collection
//!
//! A collection value that behaves like plain in-memory state, and, while an
//! owner is set, is loaded from the remote store and written back after a
//! quiet period.
//!
//! # Lifecycle
//!
//! ```text
//!              set_owner(Some(A))                load finishes
//!  Detached ─────────────────────────► Loading ─────────────────► Loaded
//!     ▲                                   │                          │
//!     └────────── set_owner(None) ────────┴──────────────────────────┘
//! ```
//!
//! - Saves are only scheduled in `Loaded`.
//! - Every identity change bumps an epoch; load results and timers from an
//!   older epoch are discarded.
//! - At most one save timer is pending; each change cancels and restarts it.
//! - Signing in as a different owner than the one whose data is held resets
//!   the value to the default before loading.

use crate::config::SyncConfig;
use crate::error::{ParseError, SyncError};
use crate::identity::OwnerId;
use crate::local::{read_records, LocalStore};
use crate::registry::CollectionSpec;
use crate::remote::RemoteStore;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Bounds for records moved by a synced collection
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Ordered records that can be read and edited in place
///
/// Implemented by [`SyncedCollection`] and
/// [`LocalCollection`](crate::local::LocalCollection) so workflows can run
/// over either.
pub trait RecordList<T>: Send + Sync {
    /// Current records
    fn get(&self) -> Vec<T>;

    /// Edit the records in place
    fn update<F: FnOnce(&mut Vec<T>)>(&self, f: F);
}

/// Observable sync state of one collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No owner; plain local state
    #[default]
    Idle,
    /// Initial load for the current owner in flight
    Loading,
    /// Local changes waiting for the quiet period to elapse
    Pending,
    /// Remote matches the last local value
    Synced,
    /// Last load or save failed
    Failed(SyncFailure),
}

impl SyncStatus {
    /// Whether the load for the current owner is still in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the last operation failed
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Where a sync failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Reading remote or legacy data
    Load,
    /// Pushing migrated legacy data
    Migrate,
    /// Debounced save
    Save,
}

/// Sync failure detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// Failing stage
    pub stage: SyncStage,
    /// Error message
    pub message: String,
}

impl SyncFailure {
    fn new(stage: SyncStage, error: &SyncError) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

/// Counters for one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Loads applied
    pub loads: u64,
    /// Legacy migrations pushed to the remote store
    pub migrations: u64,
    /// Debounced saves written
    pub saves: u64,
    /// Failed loads, migrations, and saves
    pub failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Detached,
    Loading,
    Loaded,
}

#[derive(Debug)]
struct State<T> {
    value: Vec<T>,
    owner: Option<OwnerId>,
    // owner whose loaded data `value` holds
    data_owner: Option<OwnerId>,
    phase: Phase,
    epoch: u64,
    revision: u64,
}

enum LoadOutcome<T> {
    Remote(Vec<T>),
    Migrated(Vec<T>),
    Empty,
    Recovered {
        fallback: Option<Vec<T>>,
        failure: SyncFailure,
    },
    Stale,
}

#[derive(Debug)]
struct Shared<T> {
    spec: CollectionSpec,
    default: Vec<T>,
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    config: SyncConfig,
    state: Mutex<State<T>>,
    pending_save: Mutex<Option<JoinHandle<()>>>,
    status: watch::Sender<SyncStatus>,
    stats: Mutex<SyncStats>,
}

/// Collection value synchronized with a per-owner remote document
///
/// All methods are non-blocking. Loads and saves run as spawned tokio tasks,
/// so `set_owner` with an owner (and any later change) must be called from
/// within a tokio runtime. Without an owner no task is ever spawned.
#[derive(Debug)]
pub struct SyncedCollection<T: Record> {
    shared: Arc<Shared<T>>,
}

impl<T: Record> SyncedCollection<T> {
    /// Create collection holding `default` with no owner
    #[must_use]
    pub fn new(
        spec: CollectionSpec,
        default: Vec<T>,
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        config: SyncConfig,
    ) -> Self {
        let (status, _rx) = watch::channel(SyncStatus::Idle);

        Self {
            shared: Arc::new(Shared {
                spec,
                default: default.clone(),
                remote,
                local,
                config,
                state: Mutex::new(State {
                    value: default,
                    owner: None,
                    data_owner: None,
                    phase: Phase::Detached,
                    epoch: 0,
                    revision: 0,
                }),
                pending_save: Mutex::new(None),
                status,
                stats: Mutex::new(SyncStats::default()),
            }),
        }
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> Vec<T> {
        self.shared.state.lock().value.clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.shared.state.lock().value)
    }

    /// Replace the value
    pub fn set(&self, value: Vec<T>) {
        self.update(|current| *current = value);
    }

    /// Derive the new value from the previous one
    pub fn update(&self, f: impl FnOnce(&mut Vec<T>)) {
        let epoch = {
            let mut state = self.shared.state.lock();
            f(&mut state.value);
            state.revision += 1;

            if state.owner.is_none() || state.phase != Phase::Loaded {
                return;
            }
            self.shared.status.send_replace(SyncStatus::Pending);
            state.epoch
        };

        Shared::schedule_save(&self.shared, epoch);
    }

    /// Set or clear the owner identity
    ///
    /// A new owner starts a fresh load; clearing the owner keeps the value as
    /// plain local state and cancels any pending save. Setting the owner that
    /// is already loading or loaded is a no-op.
    ///
    /// If the value holds data loaded for another owner, it is reset to the
    /// default first, so one owner's records never reach another's document.
    pub fn set_owner(&self, owner: Option<OwnerId>) {
        let mut state = self.shared.state.lock();

        match owner {
            None => {
                if state.owner.is_none() && state.phase == Phase::Detached {
                    return;
                }
                let previous = state.owner.take();
                state.phase = Phase::Detached;
                state.epoch += 1;
                self.shared.cancel_pending_save();
                self.shared.status.send_replace(SyncStatus::Idle);

                tracing::info!(
                    collection = %self.shared.spec.name,
                    owner = ?previous.as_ref().map(OwnerId::as_str),
                    "owner cleared; collection is local only"
                );
            }
            Some(owner) => {
                if state.owner.as_ref() == Some(&owner) && state.phase != Phase::Detached {
                    return;
                }
                if state.data_owner.as_ref().is_some_and(|held| held != &owner) {
                    state.value = self.shared.default.clone();
                    state.revision += 1;
                    state.data_owner = None;
                    tracing::debug!(collection = %self.shared.spec.name, owner = %owner, "reset to default for new owner");
                }
                state.owner = Some(owner.clone());
                state.phase = Phase::Loading;
                state.epoch += 1;
                let epoch = state.epoch;
                self.shared.cancel_pending_save();
                self.shared.status.send_replace(SyncStatus::Loading);
                drop(state);

                tracing::debug!(collection = %self.shared.spec.name, owner = %owner, epoch, "starting load");
                let shared = Arc::clone(&self.shared);
                tokio::spawn(async move { shared.load(owner, epoch).await });
            }
        }
    }

    /// Track an identity source, applying its current and future owners
    ///
    /// The task ends when the source closes or the collection is dropped.
    pub fn follow(self: &Arc<Self>, mut identity: watch::Receiver<Option<OwnerId>>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let initial = identity.borrow_and_update().clone();
            match weak.upgrade() {
                Some(collection) => collection.set_owner(initial),
                None => return,
            }

            while identity.changed().await.is_ok() {
                let owner = identity.borrow_and_update().clone();
                let Some(collection) = weak.upgrade() else {
                    break;
                };
                collection.set_owner(owner);
            }
        })
    }

    /// Current owner
    #[must_use]
    pub fn owner(&self) -> Option<OwnerId> {
        self.shared.state.lock().owner.clone()
    }

    /// Whether the load for the current owner has completed
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        let state = self.shared.state.lock();
        state.owner.is_some() && state.phase == Phase::Loaded
    }

    /// Current sync status
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    /// Subscribe to status changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    /// Wait until no load is in flight, returning the status at that point
    pub async fn settled(&self) -> SyncStatus {
        let mut rx = self.shared.status.subscribe();
        let status = match rx.wait_for(|s| !s.is_loading()).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        };
        status
    }

    /// Sync counters
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        *self.shared.stats.lock()
    }

    /// Collection locations
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &CollectionSpec {
        &self.shared.spec
    }
}

impl<T: Record> RecordList<T> for SyncedCollection<T> {
    fn get(&self) -> Vec<T> {
        SyncedCollection::get(self)
    }

    fn update<F: FnOnce(&mut Vec<T>)>(&self, f: F) {
        SyncedCollection::update(self, f);
    }
}

impl<T: Record> Drop for SyncedCollection<T> {
    fn drop(&mut self) {
        self.shared.cancel_pending_save();
    }
}

impl<T: Record> Shared<T> {
    fn cancel_pending_save(&self) {
        if let Some(timer) = self.pending_save.lock().take() {
            timer.abort();
        }
    }

    fn schedule_save(this: &Arc<Self>, epoch: u64) {
        let window = this.config.debounce();
        let shared = Arc::clone(this);

        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Once fired, the write is detached from the timer and cannot be
            // aborted by a later reschedule.
            tokio::spawn(async move { shared.write(epoch).await });
        });

        if let Some(previous) = this.pending_save.lock().replace(timer) {
            previous.abort();
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.lock().epoch == epoch
    }

    async fn load(self: Arc<Self>, owner: OwnerId, epoch: u64) {
        let outcome = match self.fetch(&owner, epoch).await {
            Ok(outcome) => outcome,
            Err((stage, error)) => self.recover(&owner, stage, &error),
        };
        self.apply(&owner, epoch, outcome);
    }

    async fn fetch(
        &self,
        owner: &OwnerId,
        epoch: u64,
    ) -> Result<LoadOutcome<T>, (SyncStage, SyncError)> {
        let name = &self.spec.name;

        let remote = self
            .remote
            .get(owner, name)
            .await
            .map_err(|e| (SyncStage::Load, e.into()))?;

        if let Some(records) = remote.filter(|records| !records.is_empty()) {
            let value = decode(name, records).map_err(|e| (SyncStage::Load, e.into()))?;
            return Ok(LoadOutcome::Remote(value));
        }

        let legacy = read_records::<T>(self.local.as_ref(), &self.spec.legacy_key)
            .map_err(|e| (SyncStage::Load, e.into()))?;
        let Some(legacy) = legacy else {
            return Ok(LoadOutcome::Empty);
        };

        if !self.is_current(epoch) {
            return Ok(LoadOutcome::Stale);
        }

        tracing::info!(
            collection = %name,
            owner = %owner,
            records = legacy.len(),
            "migrating legacy local data"
        );
        let records = encode(name, &legacy).map_err(|e| (SyncStage::Migrate, e.into()))?;
        self.remote
            .save(owner, name, records)
            .await
            .map_err(|e| (SyncStage::Migrate, e.into()))?;

        Ok(LoadOutcome::Migrated(legacy))
    }

    fn recover(&self, owner: &OwnerId, stage: SyncStage, error: &SyncError) -> LoadOutcome<T> {
        tracing::error!(
            collection = %self.spec.name,
            owner = %owner,
            ?stage,
            %error,
            "load failed; falling back to local data"
        );

        let fallback = match read_records::<T>(self.local.as_ref(), &self.spec.legacy_key) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(collection = %self.spec.name, error = %e, "local fallback unusable");
                None
            }
        };

        LoadOutcome::Recovered {
            fallback,
            failure: SyncFailure::new(stage, error),
        }
    }

    fn apply(&self, owner: &OwnerId, epoch: u64, outcome: LoadOutcome<T>) {
        let mut state = self.state.lock();
        if state.epoch != epoch {
            tracing::debug!(
                collection = %self.spec.name,
                owner = %owner,
                "discarding load for a previous identity"
            );
            return;
        }

        let mut stats = self.stats.lock();
        let status = match outcome {
            LoadOutcome::Stale => return,
            LoadOutcome::Remote(value) => {
                tracing::info!(collection = %self.spec.name, owner = %owner, records = value.len(), "loaded remote data");
                state.value = value;
                stats.loads += 1;
                SyncStatus::Synced
            }
            LoadOutcome::Migrated(value) => {
                state.value = value;
                stats.loads += 1;
                stats.migrations += 1;
                SyncStatus::Synced
            }
            LoadOutcome::Empty => {
                tracing::debug!(collection = %self.spec.name, owner = %owner, "nothing stored; keeping value");
                stats.loads += 1;
                SyncStatus::Synced
            }
            LoadOutcome::Recovered { fallback, failure } => {
                if let Some(value) = fallback {
                    state.value = value;
                }
                stats.failures += 1;
                SyncStatus::Failed(failure)
            }
        };

        state.data_owner = Some(owner.clone());
        state.phase = Phase::Loaded;
        self.status.send_replace(status);
    }

    async fn write(self: Arc<Self>, epoch: u64) {
        let (owner, snapshot, revision) = {
            let state = self.state.lock();
            match (&state.owner, state.phase) {
                (Some(owner), Phase::Loaded) if state.epoch == epoch => {
                    (owner.clone(), state.value.clone(), state.revision)
                }
                _ => {
                    tracing::debug!(collection = %self.spec.name, "dropping save for a previous identity");
                    return;
                }
            }
        };

        let name = &self.spec.name;
        let result = match encode(name, &snapshot) {
            Ok(records) => self
                .remote
                .save(&owner, name, records)
                .await
                .map_err(SyncError::from),
            Err(e) => Err(e.into()),
        };

        let state = self.state.lock();
        let current = state.epoch == epoch;
        let mut stats = self.stats.lock();

        match result {
            Ok(()) => {
                stats.saves += 1;
                tracing::debug!(collection = %name, owner = %owner, records = snapshot.len(), "saved");
                if current && state.revision == revision {
                    self.status.send_replace(SyncStatus::Synced);
                }
            }
            Err(error) => {
                stats.failures += 1;
                tracing::error!(collection = %name, owner = %owner, %error, "save failed; not retrying");
                if current {
                    self.status
                        .send_replace(SyncStatus::Failed(SyncFailure::new(SyncStage::Save, &error)));
                }
            }
        }
    }
}

fn encode<T: Serialize>(collection: &str, records: &[T]) -> Result<Vec<Value>, ParseError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::to_value(record).map_err(|source| ParseError::Encode {
                collection: collection.to_string(),
                index,
                source,
            })
        })
        .collect()
}

fn decode<T: DeserializeOwned>(collection: &str, records: Vec<Value>) -> Result<Vec<T>, ParseError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record).map_err(|source| ParseError::Remote {
                collection: collection.to_string(),
                index,
                source,
            })
        })
        .collect()
}
