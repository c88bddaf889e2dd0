//! Error types for publishing operations

use thiserror::Error;

/// Result type for publishing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while publishing an artifact
#[derive(Error, Debug)]
pub enum Error {
    /// Git operation error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The target repository has no working tree
    #[error("Bare repositories are not supported")]
    BareRepository,

    /// The push script exited with a failure status
    #[error("Push script failed: {0}")]
    ScriptFailed(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<Error> for atelier_core::Error {
    fn from(err: Error) -> Self {
        atelier_core::Error::Publish(err.to_string())
    }
}
