//! Match and dedup engine.
//!
//! Pure comparison logic deciding whether two candidate records denote
//! the same track at a configurable strictness level, plus in-batch
//! deduplication built on it. Nothing here touches the catalog.

use tempo_core::types::{MatchLevel, TrackCandidate};

/// Decide whether two candidates denote the same track.
///
/// At [`MatchLevel::TitleArtists`] and above, an identical local path is
/// a universal short-circuit: two records backed by the same file are
/// the same track no matter how far their titles have drifted.
pub fn same_track(
    a: &TrackCandidate,
    b: &TrackCandidate,
    level: MatchLevel,
    strict_filename: bool,
) -> bool {
    if strict_filename && a.file_name() != b.file_name() {
        return false;
    }

    match level {
        MatchLevel::Title => titles_match(a, b),
        MatchLevel::TitleArtists => {
            paths_match(a, b) || (titles_match(a, b) && artist_sets_equal(&a.artists, &b.artists))
        }
        MatchLevel::TitleArtistsAlbum => {
            paths_match(a, b)
                || (titles_match(a, b)
                    && artist_sets_equal(&a.artists, &b.artists)
                    && albums_match(a, b))
        }
    }
}

/// Order-independent artist-set equality: equal cardinality, and every
/// name in `a` has a case-insensitive counterpart in `b`.
pub fn artist_sets_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter()
        .all(|name| b.iter().any(|other| name.eq_ignore_ascii_case(other)))
}

/// Reduce a batch by folding left, discarding any candidate that
/// matches an already-accepted one. Idempotent.
pub fn dedup_candidates(
    batch: Vec<TrackCandidate>,
    level: MatchLevel,
    strict_filename: bool,
) -> Vec<TrackCandidate> {
    let mut accepted: Vec<TrackCandidate> = Vec::with_capacity(batch.len());

    for candidate in batch {
        let duplicate = accepted
            .iter()
            .any(|kept| same_track(kept, &candidate, level, strict_filename));
        if !duplicate {
            accepted.push(candidate);
        }
    }

    accepted
}

fn titles_match(a: &TrackCandidate, b: &TrackCandidate) -> bool {
    a.title.trim().eq_ignore_ascii_case(b.title.trim())
}

fn paths_match(a: &TrackCandidate, b: &TrackCandidate) -> bool {
    !a.path.as_os_str().is_empty() && a.path == b.path
}

/// Album comparison only constrains the match when both records carry
/// an album name.
fn albums_match(a: &TrackCandidate, b: &TrackCandidate) -> bool {
    match (&a.album, &b.album) {
        (Some(left), Some(right)) => left.trim().eq_ignore_ascii_case(right.trim()),
        _ => true,
    }
}
