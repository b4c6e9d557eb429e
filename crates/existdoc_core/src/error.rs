//! Error types for document synchronization.

use crate::address::RemoteAddress;
use std::io;
use thiserror::Error;

/// Result type for document synchronization.
pub type ExistResult<T> = Result<T, ExistError>;

/// Errors that can occur while loading, storing or deleting documents.
///
/// Every error is terminal to the operation that raised it. Nothing is
/// retried internally and a failed store or delete leaves the document's
/// tracked address untouched.
#[derive(Error, Debug)]
pub enum ExistError {
    /// The bound client does not satisfy the client capability contract.
    #[error("invalid database client configuration: {0}")]
    Config(String),

    /// A connection URL does not have the required scheme or path shape.
    #[error("invalid connection URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A collection or filename is malformed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No filename could be determined for a store.
    #[error("cannot determine a target filename: pass a filename or filepath")]
    AmbiguousTarget,

    /// A store would overwrite the document's own, already synced address.
    #[error("document already stored at {address}; set replace_existing to overwrite")]
    WriteConflict {
        /// The address that would have been overwritten.
        address: RemoteAddress,
    },

    /// The database answered a PUT with a non-success status.
    #[error("failed to store document at {path}: status {status}")]
    RemoteWrite {
        /// Remote path of the rejected write.
        path: String,
        /// Status returned by the database.
        status: u16,
    },

    /// The database answered a DELETE with a non-success status.
    #[error("failed to delete document at {path}: status {status}")]
    RemoteDelete {
        /// Remote path of the rejected delete.
        path: String,
        /// Status returned by the database.
        status: u16,
    },

    /// A document could not be loaded.
    ///
    /// The message is deliberately generic; the cause is available through
    /// [`std::error::Error::source`] or [`ExistError::load_failure`].
    #[error("document failed to load from {location}")]
    Load {
        /// URL or path the document was requested from.
        location: String,
        /// What went wrong.
        #[source]
        cause: Box<LoadFailure>,
    },

    /// Delete was called on a document that was never stored or loaded.
    #[error("document has no remote address")]
    NoRemoteAddress,

    /// A request could not be dispatched at all.
    #[error("transport error: {0}")]
    Transport(String),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The cause behind an [`ExistError::Load`].
#[derive(Error, Debug)]
pub enum LoadFailure {
    /// The database has no document at the requested path.
    #[error("no document at {path}")]
    NotFound {
        /// Remote path that was requested.
        path: String,
    },

    /// The database answered with another non-success status.
    #[error("unexpected status {status} for {path}")]
    Status {
        /// Remote path that was requested.
        path: String,
        /// Status returned by the database.
        status: u16,
    },

    /// Resolving the client or parsing the URL failed before any request.
    #[error(transparent)]
    Other(ExistError),
}

impl ExistError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a cause into a load error for `location`.
    pub fn load(location: impl Into<String>, cause: LoadFailure) -> Self {
        Self::Load {
            location: location.into(),
            cause: Box::new(cause),
        }
    }

    /// Returns the cause of a load error.
    pub fn load_failure(&self) -> Option<&LoadFailure> {
        match self {
            ExistError::Load { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Returns true if this is a load error caused by a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(self.load_failure(), Some(LoadFailure::NotFound { .. }))
    }

    /// Returns true if this is a write conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ExistError::WriteConflict { .. })
    }
}
