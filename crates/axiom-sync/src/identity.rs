//! Owner identity and the sign-in session
//!
//! The session is a push-based identity source: consumers subscribe to a
//! watch channel and see every sign-in and sign-out.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Opaque, stable identifier of whose data a collection holds
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create owner id, rejecting blank values
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current identity, published to subscribers
#[derive(Debug)]
pub struct Session {
    tx: watch::Sender<Option<OwnerId>>,
}

impl Session {
    /// Create signed-out session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Sign in as `owner`
    pub fn sign_in(&self, owner: OwnerId) {
        tracing::info!(owner = %owner, "signed in");
        self.tx.send_replace(Some(owner));
    }

    /// Sign out
    pub fn sign_out(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            tracing::info!(owner = %previous, "signed out");
        }
    }

    /// Current owner, if signed in
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<OwnerId> {
        self.tx.borrow().clone()
    }

    /// Subscribe to identity changes
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<OwnerId>> {
        self.tx.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
