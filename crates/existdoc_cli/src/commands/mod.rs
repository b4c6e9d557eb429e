//! Command implementations.

pub mod delete;
pub mod get;
pub mod info;
pub mod put;

use existdoc_core::ExistError;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The database operation failed.
    #[error(transparent)]
    Exist(#[from] ExistError),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An option had an unsupported value.
    #[error("unsupported output format {0:?}")]
    UnsupportedFormat(String),
}

/// Result type for CLI commands.
pub type CommandResult<T> = Result<T, CommandError>;
