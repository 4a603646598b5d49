//! Artist catalog slice.

use crate::{now_timestamp, Result};
use tempo_core::types::{Artist, ArtistId, CreateArtist, TrackId};
use sqlx::SqlitePool;
use strsim::normalized_levenshtein;

const ARTIST_COLUMNS: &str = "id, name, is_local, channel_id, thumbnail_url, created_at";

/// Similarity floor for the Levenshtein tier of closest-name matching.
const FUZZY_THRESHOLD: f64 = 0.85;

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let artists = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(artists)
}

pub async fn get_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

/// All provisional (local) artists, oldest first.
pub async fn get_local(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let artists = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists WHERE is_local = 1 ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(artists)
}

/// Find an artist by exact name.
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists WHERE name = ? LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

/// Find a canonical (non-local) artist by exact name.
pub async fn find_canonical_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists WHERE name = ? AND is_local = 0 LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

/// Find a canonical artist by its channel identifier.
pub async fn find_by_channel_id(pool: &SqlitePool, channel_id: &str) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists WHERE channel_id = ? LIMIT 1"
    ))
    .bind(channel_id)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

/// Find the closest-named artist, or `None` if nothing comes close.
///
/// Three tiers: normalized equality, then case-insensitive substring
/// containment (shortest candidate wins), then Levenshtein similarity
/// above [`FUZZY_THRESHOLD`] (best score wins).
pub async fn find_closest_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let candidates = get_all(pool).await?;
    Ok(closest_by_name(name, candidates, |a: &Artist| {
        a.name.as_str()
    }))
}

pub async fn create(pool: &SqlitePool, artist: CreateArtist) -> Result<Artist> {
    let now = now_timestamp();

    let result = sqlx::query(
        "INSERT INTO artists (name, is_local, channel_id, thumbnail_url, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&artist.name)
    .bind(artist.is_local)
    .bind(&artist.channel_id)
    .bind(&artist.thumbnail_url)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| crate::StorageError::not_found("artist", id.to_string()))
}

pub async fn delete(pool: &SqlitePool, id: ArtistId) -> Result<()> {
    sqlx::query("DELETE FROM artists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Repoint every song and album reference from one artist to another,
/// in one transaction. The superseded artist row itself is left for the
/// caller to delete.
pub async fn swap_references(pool: &SqlitePool, from: ArtistId, to: ArtistId) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE OR IGNORE track_artists SET artist_id = ? WHERE artist_id = ?")
        .bind(to)
        .bind(from)
        .execute(&mut *tx)
        .await?;

    // Rows that collided with an existing (track, to) link are left behind
    sqlx::query("DELETE FROM track_artists WHERE artist_id = ?")
        .bind(from)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE albums SET artist_id = ? WHERE artist_id = ?")
        .bind(to)
        .bind(from)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Groups of local artists sharing an exact name, each group ordered by
/// creation time then id. Only groups with more than one member.
pub async fn duplicate_local_groups(pool: &SqlitePool) -> Result<Vec<Vec<Artist>>> {
    let artists = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists
         WHERE is_local = 1
           AND name IN (
             SELECT name FROM artists WHERE is_local = 1
             GROUP BY name HAVING COUNT(*) > 1
           )
         ORDER BY name, created_at, id"
    ))
    .fetch_all(pool)
    .await?;

    let mut groups: Vec<Vec<Artist>> = Vec::new();
    for artist in artists {
        match groups.last_mut() {
            Some(group) if group[0].name == artist.name => group.push(artist),
            _ => groups.push(vec![artist]),
        }
    }

    Ok(groups)
}

/// Artist names linked to a track, in link order.
pub async fn names_for_track(pool: &SqlitePool, track_id: TrackId) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT a.name FROM artists a
         INNER JOIN track_artists ta ON ta.artist_id = a.id
         WHERE ta.track_id = ?
         ORDER BY a.id",
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Normalize a name for comparison (lowercase, trim, collapse whitespace).
pub(crate) fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared closest-name selection over an owned candidate list.
pub(crate) fn closest_by_name<T>(
    target: &str,
    candidates: Vec<T>,
    name_of: impl Fn(&T) -> &str,
) -> Option<T> {
    let normalized_target = normalize_name(target);

    let mut exact_match: Option<usize> = None;
    let mut substring_match: Option<(usize, usize)> = None; // (index, name length)
    let mut fuzzy_match: Option<(usize, f64)> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        let normalized = normalize_name(name_of(candidate));

        if normalized == normalized_target {
            exact_match = Some(i);
            break;
        }

        if normalized.contains(&normalized_target) || normalized_target.contains(&normalized) {
            let len = normalized.chars().count();
            if substring_match.map_or(true, |(_, best_len)| len < best_len) {
                substring_match = Some((i, len));
            }
            continue;
        }

        let similarity = normalized_levenshtein(&normalized_target, &normalized);
        if similarity >= FUZZY_THRESHOLD
            && fuzzy_match.map_or(true, |(_, best)| similarity > best)
        {
            fuzzy_match = Some((i, similarity));
        }
    }

    let index = exact_match
        .or(substring_match.map(|(i, _)| i))
        .or(fuzzy_match.map(|(i, _)| i))?;
    candidates.into_iter().nth(index)
}
