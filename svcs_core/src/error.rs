//! Error types for svcs_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using svcs_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during repository operations.
///
/// Variants below `Io` are ordinary outcomes the user is told about; their
/// `Display` text is the exact message the CLI prints.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// I/O error tied to a specific path.
    #[error("I/O error at {path}: {source}")]
    PathIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot manifest is corrupted or invalid.
    #[error("Corrupted manifest at {path}: {reason}")]
    CorruptedManifest { path: PathBuf, reason: String },

    /// History log record could not be parsed.
    #[error("Corrupted history record: {reason}")]
    CorruptedHistory { reason: String },

    /// Invalid commit id format or encoding.
    #[error("Invalid commit id: {reason}")]
    InvalidCommitId { reason: String },

    /// Path given to `add` does not exist.
    #[error("Can't find '{path}'.")]
    PathNotFound { path: String },

    /// No author has been configured.
    #[error("Please, set a username first with the 'config' command.")]
    AuthorNotSet,

    /// The tracked file list is empty.
    #[error("No files are tracked.")]
    NothingTracked,

    /// No snapshot exists for the requested commit.
    #[error("Commit does not exist.")]
    CommitNotFound { id: String },
}

impl Error {
    /// Create a PathIo error.
    pub fn path_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::PathIo {
            path: path.into(),
            source,
        }
    }

    /// Create a CorruptedManifest error.
    pub fn corrupted_manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptedManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a CorruptedHistory error.
    pub fn corrupted_history(reason: impl Into<String>) -> Self {
        Error::CorruptedHistory {
            reason: reason.into(),
        }
    }

    /// Create an InvalidCommitId error.
    pub fn invalid_commit_id(reason: impl Into<String>) -> Self {
        Error::InvalidCommitId {
            reason: reason.into(),
        }
    }

    /// Create a PathNotFound error.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Error::PathNotFound { path: path.into() }
    }

    /// Create a CommitNotFound error.
    pub fn commit_not_found(id: impl Into<String>) -> Self {
        Error::CommitNotFound { id: id.into() }
    }

    /// Whether this is a normal condition reported to the user rather than a failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound { .. }
                | Error::AuthorNotSet
                | Error::NothingTracked
                | Error::CommitNotFound { .. }
        )
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
