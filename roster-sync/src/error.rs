//! Error types for roster-sync.

use std::path::PathBuf;

use thiserror::Error;

use roster_core::ConfigError;

/// A failure reported by an external collaborator (directory, content store,
/// photo uploader).
///
/// These are absorbed per office or per record; they only become fatal when
/// wrapped in a [`SyncError`].
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or timed out.
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },

    /// The collaborator answered but refused the request (non-2xx, unknown id).
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },

    /// The collaborator's payload could not be decoded.
    #[error("{service} returned an undecodable payload: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// Local filesystem failure inside a collaborator.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a run before any record is processed.
///
/// Per-office and per-record failures never surface here; they are collected
/// in the [`RunReport`](crate::RunReport).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Sync disabled, no offices, unreadable config.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Every configured office failed to fetch.
    #[error("agent directory unreachable: all {offices} office fetch(es) failed; last error: {last}")]
    DirectoryUnreachable { offices: usize, last: String },

    /// The roster snapshot could not be read.
    #[error("roster unavailable: {0}")]
    RosterUnavailable(#[source] CollaboratorError),

    /// An I/O error, with annotated path for context (run report store).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (run report store).
    #[error("run report JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
