//! Error types for collection sync
//!
//! Provides error handling for:
//! - Remote store transport failures
//! - Malformed stored data (remote records or legacy local text)
//! - Local store persistence failures
//! - Registry and configuration lookups
//!
//! None of these reach the caller of `set`/`update` on a collection; load and
//! save failures are logged and surfaced through [`crate::SyncStatus`].

use std::path::PathBuf;

/// Main sync error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Remote store unreachable or denied
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Stored data could not be decoded
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Local store failed to persist
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// Collection name not present in the registry
    #[error("unknown collection: '{0}'")]
    UnknownCollection(String),

    /// Backup file is not valid JSON
    #[error("invalid backup: {0}")]
    Backup(#[source] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Check if the failure may succeed on a later attempt
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Store(StoreError::Io { .. }) => true,
            _ => false,
        }
    }
}

/// Transport failure kinds reported by a remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Network or service unavailable
    Unavailable,
    /// Permission denied for this owner
    PermissionDenied,
    /// Request took too long
    Timeout,
    /// Anything else
    Other,
}

/// Remote store failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    /// Failure classification
    pub kind: TransportErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl TransportError {
    /// Create transport error of a given kind
    #[inline]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Service unavailable
    #[inline]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unavailable, message)
    }

    /// Permission denied
    #[inline]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::PermissionDenied, message)
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::Unavailable | TransportErrorKind::Timeout
        )
    }
}

/// Stored data could not be decoded into records
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Legacy local text is not valid JSON for the record type
    #[error("malformed local data under '{key}': {source}")]
    Local {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A remote record does not match the record type
    #[error("malformed remote record {index} in '{collection}': {source}")]
    Remote {
        collection: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded for saving
    #[error("cannot encode record {index} of '{collection}': {source}")]
    Encode {
        collection: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Local store persistence failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file is not a JSON object of strings
    #[error("corrupt store file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = TransportError::unavailable("offline");
        assert!(err.to_string().contains("offline"));
        assert!(err.to_string().contains("Unavailable"));
    }

    #[test]
    fn transport_error_is_retryable() {
        assert!(TransportError::unavailable("x").is_retryable());
        assert!(TransportError::new(TransportErrorKind::Timeout, "x").is_retryable());
        assert!(!TransportError::permission_denied("x").is_retryable());
    }

    #[test]
    fn sync_error_from_transport() {
        let err: SyncError = TransportError::unavailable("down").into();
        assert!(matches!(err, SyncError::Transport(_)));
        assert!(err.is_retryable());
        assert!(!SyncError::UnknownCollection("x".into()).is_retryable());
    }

    #[test]
    fn parse_error_names_key() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = ParseError::Local {
            key: "axiom_notes".into(),
            source,
        };
        assert!(err.to_string().contains("axiom_notes"));
    }
}
