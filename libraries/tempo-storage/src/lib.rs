//! Tempo Storage
//!
//! `SQLite` catalog layer for the Tempo library engine.
//!
//! The catalog is the only durable, shared-mutable state in the system:
//! tracks, artists, albums, genres, format records, and play statistics.
//! Each feature owns its queries in a vertical slice; multi-row writes
//! that must land together are grouped into a single transaction.
//!
//! # Example
//!
//! ```rust,no_run
//! use tempo_storage::{create_pool, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://tempo.db").await?;
//! run_migrations(&pool).await?;
//!
//! let tracks = tempo_storage::tracks::get_all(&pool).await?;
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod formats;
pub mod genres;
pub mod stats;
pub mod tracks;

pub use error::{Result, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into the binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations.
///
/// Call once at startup to bring the schema up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://tempo.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Current unix timestamp in seconds.
pub(crate) fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
