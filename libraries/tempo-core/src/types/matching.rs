//! Match strictness levels

use serde::{Deserialize, Serialize};

/// Strictness tier used to decide whether two records denote the same
/// track.
///
/// - `Title` compares titles only.
/// - `TitleArtists` adds artist-set equality, short-circuited by exact
///   path equality.
/// - `TitleArtistsAlbum` additionally compares album names when both
///   records carry one.
///
/// The orthogonal strict-filename flag is passed alongside the level,
/// not encoded in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchLevel {
    Title,
    TitleArtists,
    TitleArtistsAlbum,
}

impl Default for MatchLevel {
    fn default() -> Self {
        Self::TitleArtists
    }
}

impl MatchLevel {
    /// Parse a 1..=3 tier number.
    pub fn from_tier(tier: u8) -> Option<Self> {
        match tier {
            1 => Some(Self::Title),
            2 => Some(Self::TitleArtists),
            3 => Some(Self::TitleArtistsAlbum),
            _ => None,
        }
    }

    /// The 1..=3 tier number.
    pub fn tier(self) -> u8 {
        match self {
            Self::Title => 1,
            Self::TitleArtists => 2,
            Self::TitleArtistsAlbum => 3,
        }
    }
}
