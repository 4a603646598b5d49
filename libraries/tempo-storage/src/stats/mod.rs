//! Play statistics slice.
//!
//! Written by the playback collaborator, read by duplicate pruning.

use crate::Result;
use tempo_core::types::TrackId;
use sqlx::SqlitePool;

/// Lifetime play count for a track (0 if no stats row exists).
pub async fn play_count(pool: &SqlitePool, track_id: TrackId) -> Result<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT play_count FROM track_stats WHERE track_id = ?")
            .bind(track_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map_or(0, |(count,)| count))
}

/// Record one playback of a track.
pub async fn increment_play_count(pool: &SqlitePool, track_id: TrackId) -> Result<()> {
    sqlx::query(
        "INSERT INTO track_stats (track_id, play_count) VALUES (?, 1)
         ON CONFLICT(track_id) DO UPDATE SET play_count = play_count + 1",
    )
    .bind(track_id)
    .execute(pool)
    .await?;

    Ok(())
}
