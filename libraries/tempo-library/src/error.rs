//! Error types for the library engine

use thiserror::Error;

/// Result type alias using `LibraryError`
pub type Result<T> = std::result::Result<T, LibraryError>;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// Cooperative cancellation was observed. Expected, not a bug;
    /// callers present it as "scan aborted".
    #[error("Scan aborted")]
    Aborted,

    /// A sync-family operation is already holding the single-writer gate.
    #[error("A sync operation is already active")]
    AlreadyActive,

    /// Unsupported or inconsistent backend configuration. Fatal.
    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    /// Catalog error
    #[error("Storage error: {0}")]
    Storage(#[from] tempo_storage::StorageError),

    /// Extraction error that escaped the per-file recovery paths
    #[error("Metadata error: {0}")]
    Metadata(#[from] tempo_metadata::MetadataError),

    /// Remote lookup error
    #[error("Lookup error: {0}")]
    Lookup(#[from] tempo_core::CoreError),

    /// Background task failure
    #[error("Task error: {0}")]
    Task(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LibraryError {
    /// Whether this is the expected scan-aborted condition.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
