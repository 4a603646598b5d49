//! Genre catalog slice.

use crate::artists::closest_by_name;
use crate::Result;
use tempo_core::types::{CreateGenre, Genre, GenreId, TrackId};
use sqlx::SqlitePool;

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(genres)
}

pub async fn get_by_id(pool: &SqlitePool, id: GenreId) -> Result<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(genre)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE name = ? LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(genre)
}

/// Find the closest-named genre; same tiers as the artist lookup.
pub async fn find_closest_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Genre>> {
    let candidates = get_all(pool).await?;
    Ok(closest_by_name(name, candidates, |g: &Genre| {
        g.name.as_str()
    }))
}

pub async fn create(pool: &SqlitePool, genre: CreateGenre) -> Result<Genre> {
    let result = sqlx::query("INSERT INTO genres (name) VALUES (?)")
        .bind(&genre.name)
        .execute(pool)
        .await?;

    let id = result.last_insert_rowid();

    Ok(Genre {
        id,
        name: genre.name,
    })
}

pub async fn delete(pool: &SqlitePool, id: GenreId) -> Result<()> {
    sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Genre names linked to a track.
pub async fn names_for_track(pool: &SqlitePool, track_id: TrackId) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT g.name FROM genres g
         INNER JOIN track_genres tg ON tg.genre_id = g.id
         WHERE tg.track_id = ?
         ORDER BY g.id",
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}
