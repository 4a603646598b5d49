//! Tempo Core
//!
//! Platform-agnostic domain types, capability traits, and error handling
//! for the Tempo library engine.
//!
//! This crate defines:
//! - **Domain Types**: `Track`, `TrackCandidate`, `Artist`, `Genre`, `Album`
//! - **Capability Traits**: `ArtistLookup` (remote identity resolution)
//! - **Error Handling**: unified `CoreError` and `Result` types

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::ArtistLookup;

pub use types::{
    Album, AlbumId, Artist, ArtistId, CreateAlbum, CreateArtist, CreateGenre, CreateTrack,
    FormatRecord, Genre, GenreId, MatchLevel, RemoteArtist, Track, TrackCandidate, TrackId,
    TrackSortKey,
};
