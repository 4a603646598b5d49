//! Error types for metadata extraction

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// The file exists but cannot be opened and prepared for decoding.
    /// Callers skip these files; they are never fatal to a batch.
    #[error("Not playable: {0}")]
    NotPlayable(PathBuf),

    /// Tag data could not be parsed. Normally absorbed inside the
    /// provider by falling back to a filename-derived candidate.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MetadataError {
    /// Whether this failure means "skip the file" rather than "abort".
    pub fn is_not_playable(&self) -> bool {
        matches!(self, Self::NotPlayable(_))
    }
}
