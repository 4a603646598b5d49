//! Capability traits consumed by the library engine

use crate::error::Result;
use crate::types::RemoteArtist;
use async_trait::async_trait;

/// Remote artist identity lookup.
///
/// The engine only ever asks one question of the remote authority: "is
/// there a canonical artist with exactly this name?". Matching is
/// case-insensitive on the remote side; the returned identity carries the
/// canonical channel id used for uniqueness within the catalog.
#[async_trait]
pub trait ArtistLookup: Send + Sync {
    /// Search for an artist by exact (case-insensitive) name.
    ///
    /// Returns `None` when the authority has no exact match.
    async fn search_exact(&self, name: &str) -> Result<Option<RemoteArtist>>;
}
