//! Track catalog slice.
//!
//! All multi-row writes that belong to one track (the row itself, its
//! artist/genre links, its format record) are grouped into a single
//! transaction so an interrupted sync never leaves a half-written track.

use crate::{now_timestamp, Result};
use tempo_core::types::{ArtistId, CreateTrack, FormatRecord, GenreId, Track, TrackId};
use sqlx::SqlitePool;

const TRACK_COLUMNS: &str = "id, title, duration_seconds, local_path, added_at, \
     is_local, is_liked, modified_at, album_id, year";

/// Get all tracks.
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let tracks = sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks ORDER BY title"
    ))
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// Get all local tracks (any membership state).
pub async fn get_all_local(pool: &SqlitePool) -> Result<Vec<Track>> {
    let tracks = sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE is_local = 1 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// Get a track by id.
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let track = sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(track)
}

/// Find the track backed by an exact local path.
pub async fn find_by_path(pool: &SqlitePool, local_path: &str) -> Result<Option<Track>> {
    let track = sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE local_path = ? ORDER BY id LIMIT 1"
    ))
    .bind(local_path)
    .fetch_optional(pool)
    .await?;

    Ok(track)
}

/// Search tracks by title, case-insensitive.
pub async fn search_by_title(pool: &SqlitePool, title: &str) -> Result<Vec<Track>> {
    let tracks = sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE title = ? COLLATE NOCASE ORDER BY id"
    ))
    .bind(title)
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// Insert a brand-new track together with its format record, artist and
/// genre links, and an empty stats row, in one transaction.
pub async fn insert_full(
    pool: &SqlitePool,
    create: CreateTrack,
    format: Option<&FormatRecord>,
    artist_ids: &[ArtistId],
    genre_ids: &[GenreId],
) -> Result<Track> {
    let now = now_timestamp();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO tracks (title, duration_seconds, local_path, added_at, \
         is_local, is_liked, modified_at, album_id, year)
         VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)",
    )
    .bind(&create.title)
    .bind(create.duration_seconds)
    .bind(&create.local_path)
    .bind(now)
    .bind(create.is_local)
    .bind(create.modified_at)
    .bind(create.album_id)
    .bind(create.year)
    .execute(&mut *tx)
    .await?;

    let track_id = result.last_insert_rowid();

    for artist_id in artist_ids {
        sqlx::query("INSERT OR IGNORE INTO track_artists (track_id, artist_id) VALUES (?, ?)")
            .bind(track_id)
            .bind(artist_id)
            .execute(&mut *tx)
            .await?;
    }

    for genre_id in genre_ids {
        sqlx::query("INSERT OR IGNORE INTO track_genres (track_id, genre_id) VALUES (?, ?)")
            .bind(track_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(format) = format {
        insert_format(&mut tx, track_id, format).await?;
    }

    sqlx::query("INSERT OR IGNORE INTO track_stats (track_id, play_count) VALUES (?, 0)")
        .bind(track_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_by_id(pool, track_id)
        .await?
        .ok_or_else(|| crate::StorageError::not_found("track", track_id.to_string()))
}

/// Fields written to an existing track during a full-refresh sync.
#[derive(Debug, Clone)]
pub struct RefreshTrack {
    pub title: String,
    pub duration_seconds: Option<f64>,
    pub local_path: Option<String>,
    pub modified_at: Option<i64>,
    pub album_id: Option<i64>,
    pub year: Option<i32>,
}

/// Overwrite an existing track's stored metadata and rebuild its
/// artist/genre links and format record, in one transaction.
///
/// The row id and any existing local path are preserved; the candidate
/// path only fills in a currently-null path. Membership is restored if
/// it was cleared.
pub async fn apply_refresh(
    pool: &SqlitePool,
    id: TrackId,
    refresh: &RefreshTrack,
    format: Option<&FormatRecord>,
    artist_ids: &[ArtistId],
    genre_ids: &[GenreId],
) -> Result<()> {
    let now = now_timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE tracks SET title = ?, duration_seconds = ?, \
         local_path = COALESCE(local_path, ?), added_at = COALESCE(added_at, ?), \
         modified_at = ?, album_id = ?, year = ? WHERE id = ?",
    )
    .bind(&refresh.title)
    .bind(refresh.duration_seconds)
    .bind(&refresh.local_path)
    .bind(now)
    .bind(refresh.modified_at)
    .bind(refresh.album_id)
    .bind(refresh.year)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM track_artists WHERE track_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for artist_id in artist_ids {
        sqlx::query("INSERT OR IGNORE INTO track_artists (track_id, artist_id) VALUES (?, ?)")
            .bind(id)
            .bind(artist_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM track_genres WHERE track_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT OR IGNORE INTO track_genres (track_id, genre_id) VALUES (?, ?)")
            .bind(id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(format) = format {
        insert_format(&mut tx, id, format).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Adopt an existing row during an additive sync: restore membership,
/// fill in a null local path, and record the file's modification time.
///
/// Single statement, so atomic on its own; callers only invoke this for
/// rows whose membership or local path is currently null.
pub async fn adopt(
    pool: &SqlitePool,
    id: TrackId,
    local_path: &str,
    modified_at: Option<i64>,
) -> Result<()> {
    let now = now_timestamp();

    sqlx::query(
        "UPDATE tracks SET local_path = COALESCE(local_path, ?), added_at = ?, modified_at = ? \
         WHERE id = ?",
    )
    .bind(local_path)
    .bind(now)
    .bind(modified_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Disable a track: clear its membership timestamp but keep the row.
pub async fn disable(pool: &SqlitePool, id: TrackId) -> Result<()> {
    sqlx::query("UPDATE tracks SET added_at = NULL WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Hard-delete a track. Links, format, and stats rows cascade.
///
/// Only duplicate pruning is allowed to call this; everything else
/// disables instead.
pub async fn delete(pool: &SqlitePool, id: TrackId) -> Result<()> {
    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Groups of track ids sharing an identical non-null local path.
///
/// Only paths with more than one row are returned; ids within a group
/// are ordered ascending.
pub async fn duplicates_by_path(pool: &SqlitePool) -> Result<Vec<(String, Vec<TrackId>)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT local_path, id FROM tracks
         WHERE local_path IS NOT NULL
           AND local_path IN (
             SELECT local_path FROM tracks
             WHERE local_path IS NOT NULL
             GROUP BY local_path HAVING COUNT(*) > 1
           )
         ORDER BY local_path, id",
    )
    .fetch_all(pool)
    .await?;

    let mut groups: Vec<(String, Vec<TrackId>)> = Vec::new();
    for (path, id) in rows {
        match groups.last_mut() {
            Some((last_path, ids)) if *last_path == path => ids.push(id),
            _ => groups.push((path, vec![id])),
        }
    }

    Ok(groups)
}

async fn insert_format(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    track_id: TrackId,
    format: &FormatRecord,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO track_formats (track_id, container, bitrate, sample_rate, channels, content_length)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(track_id) DO UPDATE SET
             container = excluded.container,
             bitrate = excluded.bitrate,
             sample_rate = excluded.sample_rate,
             channels = excluded.channels,
             content_length = excluded.content_length",
    )
    .bind(track_id)
    .bind(&format.container)
    .bind(format.bitrate)
    .bind(format.sample_rate)
    .bind(format.channels.map(i64::from))
    .bind(format.content_length.map(|l| l as i64))
    .execute(&mut **tx)
    .await?;

    Ok(())
}
