//! Domain types for the Tempo catalog

mod album;
mod artist;
mod genre;
mod ids;
mod matching;
mod track;

pub use album::{Album, CreateAlbum};
pub use artist::{Artist, CreateArtist, RemoteArtist};
pub use genre::{CreateGenre, Genre};
pub use ids::{AlbumId, ArtistId, GenreId, TrackId};
pub use matching::MatchLevel;
pub use track::{CreateTrack, FormatRecord, Track, TrackCandidate, TrackSortKey};
