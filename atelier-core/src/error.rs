//! Error types for Atelier

use thiserror::Error;

/// Result type alias for Atelier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Atelier operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An agent could not produce a response (fatal to the current run)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Publishing the approved artifact failed (session stays pending)
    #[error("Publish error: {0}")]
    Publish(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session lookup failed
    #[error("Session {0} not found")]
    SessionNotFound(u64),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
