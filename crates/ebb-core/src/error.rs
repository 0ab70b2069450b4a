//! Error types for ebb-core

use thiserror::Error;

/// Result type alias using ebb-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ebb-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote source error (transport, auth, or backend failure)
    #[error("Remote source error: {0}")]
    Remote(#[from] crate::remote::RemoteError),

    /// Local store error
    #[error("Local store error: {0}")]
    Store(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timestamp parse error
    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
