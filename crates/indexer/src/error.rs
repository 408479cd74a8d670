use thiserror::Error;

/// Result type for indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Errors raised while indexing a repository
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Root path missing or not a directory
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// IO error while walking or reading files
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Store adapter failure
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),

    /// Background task failure
    #[error("task error: {0}")]
    Task(String),
}
