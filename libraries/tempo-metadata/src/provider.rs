//! Metadata extraction capability

use crate::error::Result;
use tempo_core::types::TrackCandidate;
use std::path::Path;

/// Turns a file path into a structured track candidate.
///
/// Implementations must probe the file for playability before doing any
/// expensive work, and must degrade to a filename-derived candidate when
/// the file is playable but its tags are unreadable. Extraction is
/// blocking; the scan orchestrator runs it on blocking worker threads.
pub trait MetadataProvider: Send + Sync {
    /// Extract a candidate from the file at `path`.
    fn extract(&self, path: &Path) -> Result<TrackCandidate>;
}
