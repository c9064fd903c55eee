//! Error types for roster-adapters.

use std::path::PathBuf;

use thiserror::Error;

use roster_sync::CollaboratorError;

/// Failures inside a concrete collaborator.
///
/// The engine only sees these as [`CollaboratorError`]s; the `From` impl below
/// decides which bucket each one lands in.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Connection refused, DNS failure, timeout.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A downloaded photo was not an image.
    #[error("{url} is not an image (content-type: {content_type})")]
    NotAnImage { url: String, content_type: String },

    /// A downloaded photo exceeded the size limit.
    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    /// Patch addressed to an entry the store does not hold.
    #[error("no roster entry with id {0}")]
    UnknownEntry(String),

    /// Create for an identity the store already holds.
    #[error("roster entry {0} already exists")]
    DuplicateEntry(String),

    /// A payload or file could not be decoded.
    #[error("cannot decode {what}: {message}")]
    Decode { what: String, message: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl AdapterError {
    fn service(&self) -> &'static str {
        match self {
            AdapterError::NotAnImage { .. } | AdapterError::TooLarge { .. } => "photo",
            AdapterError::UnknownEntry(_) | AdapterError::DuplicateEntry(_) => "roster",
            _ => "adapter",
        }
    }
}

impl From<AdapterError> for CollaboratorError {
    fn from(err: AdapterError) -> Self {
        let service = err.service();
        match err {
            AdapterError::Io { path, source } => CollaboratorError::Io { path, source },
            AdapterError::Transport { .. } | AdapterError::Task(_) => {
                CollaboratorError::Unavailable {
                    service,
                    message: err.to_string(),
                }
            }
            AdapterError::Decode { .. } => CollaboratorError::Decode {
                service,
                message: err.to_string(),
            },
            _ => CollaboratorError::Rejected {
                service,
                message: err.to_string(),
            },
        }
    }
}

/// Convenience constructor for [`AdapterError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AdapterError {
    AdapterError::Io {
        path: path.into(),
        source,
    }
}

/// Map a `ureq` failure onto [`AdapterError`].
pub(crate) fn http_err(url: &str, err: ureq::Error) -> AdapterError {
    match err {
        ureq::Error::Status(status, _) => AdapterError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(t) => AdapterError::Transport {
            url: url.to_string(),
            message: t.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_unavailable() {
        let err: CollaboratorError = AdapterError::Transport {
            url: "http://dir".into(),
            message: "connection refused".into(),
        }
        .into();
        assert!(matches!(err, CollaboratorError::Unavailable { .. }));
    }

    #[test]
    fn unknown_entry_is_a_rejection_from_the_roster() {
        let err: CollaboratorError = AdapterError::UnknownEntry("teamMember-1".into()).into();
        match err {
            CollaboratorError::Rejected { service, message } => {
                assert_eq!(service, "roster");
                assert!(message.contains("teamMember-1"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
