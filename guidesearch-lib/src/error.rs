//! Error types for guidesearch

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for guidesearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or querying an index
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid chunking or retrieval parameters
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No snapshot exists at the given path
    #[error("embedding store not found at {}", .0.display())]
    StoreNotFound(PathBuf),

    /// Snapshot exists but is malformed or inconsistent
    #[error("embedding store is corrupt: {0}")]
    StoreCorrupt(String),

    /// The embedding provider failed or returned unusable vectors
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The corpus directory or one of its documents could not be read
    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
