//! Format record slice.

use crate::Result;
use tempo_core::types::{FormatRecord, TrackId};
use sqlx::SqlitePool;

/// Insert or replace the format record for a track.
pub async fn upsert(pool: &SqlitePool, track_id: TrackId, format: &FormatRecord) -> Result<()> {
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
    .execute(pool)
    .await?;

    Ok(())
}

/// Format record for a track, if one is stored.
pub async fn get_by_track(pool: &SqlitePool, track_id: TrackId) -> Result<Option<FormatRecord>> {
    let row: Option<(String, Option<i64>, Option<i64>, Option<i64>, Option<i64>)> = sqlx::query_as(
        "SELECT container, bitrate, sample_rate, channels, content_length
         FROM track_formats WHERE track_id = ?",
    )
    .bind(track_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(container, bitrate, sample_rate, channels, content_length)| FormatRecord {
            container,
            bitrate: bitrate.map(|v| v as u32),
            sample_rate: sample_rate.map(|v| v as u32),
            channels: channels.map(|v| v as u8),
            content_length: content_length.map(|v| v as u64),
        },
    ))
}
