//! Error types for repoprobe

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for repoprobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for repoprobe operations
///
/// Engine failures are tagged by class so that scenario fallback tables can
/// match on them (see [`ErrorKind`]).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path has no version-control metadata
    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// A git command (clone, push, pull, remote add, ...) failed
    #[error("git {command} failed: {message}")]
    Command { command: String, message: String },

    /// Generic engine error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// The named remote is not configured
    #[error("Remote '{name}' is not configured")]
    MissingRemote { name: String },

    /// The named branch does not exist
    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    /// Integrating remote revisions produced conflicts
    #[error("Merge conflict: {message}")]
    MergeConflict { message: String },

    /// The remote refused a reference update
    #[error("Push of {refname} rejected: {message}")]
    PushRejected { refname: String, message: String },

    /// A scenario post-condition did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Fieldless tag for an [`Error`], used by scenario fallback tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Json,
    Config,
    NotARepository,
    Command,
    Git,
    MissingRemote,
    BranchNotFound,
    MergeConflict,
    PushRejected,
    Assertion,
    Other,
}

impl Error {
    /// Build a [`Error::Command`] from a command name and an engine error
    pub fn command(command: impl Into<String>, err: git2::Error) -> Self {
        Error::Command {
            command: command.into(),
            message: err.message().to_string(),
        }
    }

    /// The class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
            Error::Config(_) => ErrorKind::Config,
            Error::NotARepository { .. } => ErrorKind::NotARepository,
            Error::Command { .. } => ErrorKind::Command,
            Error::Git(_) => ErrorKind::Git,
            Error::MissingRemote { .. } => ErrorKind::MissingRemote,
            Error::BranchNotFound { .. } => ErrorKind::BranchNotFound,
            Error::MergeConflict { .. } => ErrorKind::MergeConflict,
            Error::PushRejected { .. } => ErrorKind::PushRejected,
            Error::Assertion(_) => ErrorKind::Assertion,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether the error originated in the version-control engine
    pub fn is_engine(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotARepository
                | ErrorKind::Command
                | ErrorKind::Git
                | ErrorKind::MissingRemote
                | ErrorKind::BranchNotFound
                | ErrorKind::MergeConflict
                | ErrorKind::PushRejected
        )
    }
}
