/// Track domain types
use crate::types::{AlbumId, TrackId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A track in the catalog.
///
/// `added_at` doubles as the library-membership marker: `None` means the
/// track is disabled (still known, not currently part of the library).
/// A track with a `Some` local path that stops resolving to a file gets
/// disabled, never deleted; hard deletion only happens through duplicate
/// pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Duration in seconds
    pub duration_seconds: Option<f64>,

    /// Path on disk; `None` means not currently backed by a file
    pub local_path: Option<String>,

    /// Library-membership timestamp (unix seconds); `None` = disabled
    pub added_at: Option<i64>,

    /// Whether the track originates from a local file
    pub is_local: bool,

    /// User "liked" flag
    pub is_liked: bool,

    /// Last-modified timestamp of the backing file (unix seconds)
    pub modified_at: Option<i64>,

    /// Album reference
    pub album_id: Option<AlbumId>,

    /// Release year
    pub year: Option<i32>,
}

impl Track {
    /// Whether the track is currently part of the library.
    pub fn is_enabled(&self) -> bool {
        self.added_at.is_some()
    }

    /// File name component of the local path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.local_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
    }
}

/// Data for creating a new catalog track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    pub duration_seconds: Option<f64>,
    pub local_path: Option<String>,
    pub is_local: bool,
    pub modified_at: Option<i64>,
    pub album_id: Option<AlbumId>,
    pub year: Option<i32>,
}

/// Container-level format information for a track's backing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRecord {
    /// Container or codec name (file extension, lowercased)
    pub container: String,

    /// Bitrate in kbps
    pub bitrate: Option<u32>,

    /// Sample rate in Hz
    pub sample_rate: Option<u32>,

    /// Channel count
    pub channels: Option<u8>,

    /// File size in bytes
    pub content_length: Option<u64>,
}

/// Metadata extracted from one file during a scan.
///
/// Candidates are ephemeral: they carry no catalog identity and are
/// discarded once the reconciler has committed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackCandidate {
    /// Track title (tag value or file stem)
    pub title: String,

    /// Duration in seconds
    pub duration_seconds: Option<f64>,

    /// Album name
    pub album: Option<String>,

    /// Release year
    pub year: Option<i32>,

    /// Artist names, split and deduplicated
    pub artists: Vec<String>,

    /// Genre names, split and deduplicated
    pub genres: Vec<String>,

    /// Source file path
    pub path: PathBuf,

    /// Last-modified timestamp of the file (unix seconds)
    pub modified_at: Option<i64>,

    /// Container format details
    pub format: Option<FormatRecord>,
}

impl TrackCandidate {
    /// Minimal candidate derived from a path alone: title is the file
    /// stem, everything else empty. Used when tags are unreadable and
    /// for the cheap pre-filter pass of an additive sync.
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();

        let modified_at = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);

        Self {
            title,
            duration_seconds: None,
            album: None,
            year: None,
            artists: Vec::new(),
            genres: Vec::new(),
            path: path.to_path_buf(),
            modified_at,
            format: None,
        }
    }

    /// File name component of the candidate path.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Sort key for track listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackSortKey {
    Title,
    Duration,
    AddedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_from_path_uses_file_stem() {
        let candidate = TrackCandidate::from_path(Path::new("/music/My Song.mp3"));
        assert_eq!(candidate.title, "My Song");
        assert_eq!(candidate.path, PathBuf::from("/music/My Song.mp3"));
        assert!(candidate.artists.is_empty());
        assert!(candidate.format.is_none());
    }

    #[test]
    fn track_enabled_follows_membership() {
        let mut track = Track {
            id: 1,
            title: "Song".to_string(),
            duration_seconds: Some(180.0),
            local_path: Some("/music/song.mp3".to_string()),
            added_at: Some(1_700_000_000),
            is_local: true,
            is_liked: false,
            modified_at: None,
            album_id: None,
            year: None,
        };
        assert!(track.is_enabled());

        track.added_at = None;
        assert!(!track.is_enabled());
    }

    #[test]
    fn track_file_name() {
        let track = Track {
            id: 1,
            title: "Song".to_string(),
            duration_seconds: None,
            local_path: Some("/music/sub/song.mp3".to_string()),
            added_at: None,
            is_local: true,
            is_liked: false,
            modified_at: None,
            album_id: None,
            year: None,
        };
        assert_eq!(track.file_name(), Some("song.mp3"));
    }
}
