//! Album catalog slice.

use crate::Result;
use tempo_core::types::{Album, AlbumId, TrackId};
use sqlx::SqlitePool;

pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let album =
        sqlx::query_as::<_, Album>("SELECT id, title, artist_id, year FROM albums WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(album)
}

pub async fn find_by_title(pool: &SqlitePool, title: &str) -> Result<Option<Album>> {
    let album = sqlx::query_as::<_, Album>(
        "SELECT id, title, artist_id, year FROM albums WHERE title = ? COLLATE NOCASE LIMIT 1",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    Ok(album)
}

/// Look up an album by title, creating it if unknown.
pub async fn get_or_create(
    pool: &SqlitePool,
    title: &str,
    year: Option<i32>,
) -> Result<AlbumId> {
    if let Some(album) = find_by_title(pool, title).await? {
        return Ok(album.id);
    }

    let result = sqlx::query("INSERT INTO albums (title, year) VALUES (?, ?)")
        .bind(title)
        .bind(year)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Album title for a track, if it has one.
pub async fn title_for_track(pool: &SqlitePool, track_id: TrackId) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT al.title FROM albums al
         INNER JOIN tracks t ON t.album_id = al.id
         WHERE t.id = ?",
    )
    .bind(track_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(title,)| title))
}
