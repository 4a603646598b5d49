//! Artist types

use crate::types::ArtistId;
use serde::{Deserialize, Serialize};

/// An artist.
///
/// `is_local` marks a synthesized placeholder identity created during a
/// scan, pending resolution against the remote authority. Canonical
/// (non-local) artists are unique by `channel_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub is_local: bool,
    pub channel_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: i64,
}

/// Data for creating a new artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtist {
    pub name: String,
    pub is_local: bool,
    pub channel_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl CreateArtist {
    /// A provisional local identity with just a name.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_local: true,
            channel_id: None,
            thumbnail_url: None,
        }
    }
}

/// Canonical identity returned by the remote lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArtist {
    pub channel_id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
}
