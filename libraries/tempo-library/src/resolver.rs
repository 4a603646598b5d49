//! Remote identity resolver.
//!
//! Opportunistic background job that replaces locally-synthesized artist
//! identities with canonical ones from the remote lookup, swapping
//! references across the catalog. Shares the single-writer gate with the
//! sync engine and refuses to run while a sync is active.

use crate::error::{LibraryError, Result};
use crate::sync::SyncGate;
use tempo_core::types::CreateArtist;
use tempo_core::ArtistLookup;
use tempo_storage::artists;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Statistics from one resolution pass.
#[derive(Debug, Default, Clone)]
pub struct ResolveSummary {
    /// Local artists swapped to a canonical identity
    pub resolved: usize,

    /// Local artists left untouched (no match, or lookup failure)
    pub skipped: usize,
}

/// Background resolver over a pluggable remote lookup.
pub struct ArtistResolver<L> {
    pool: SqlitePool,
    lookup: Arc<L>,
    gate: Arc<SyncGate>,
}

impl<L: ArtistLookup> ArtistResolver<L> {
    pub fn new(pool: SqlitePool, lookup: Arc<L>, gate: Arc<SyncGate>) -> Self {
        Self { pool, lookup, gate }
    }

    /// Resolve every local artist in the catalog.
    ///
    /// For each one: prefer an existing canonical artist with the same
    /// exact name; otherwise ask the remote authority. Lookup failures
    /// and misses leave the local artist untouched.
    pub async fn resolve_all(&self, token: &CancellationToken) -> Result<ResolveSummary> {
        let _session = self.gate.begin()?;
        let mut summary = ResolveSummary::default();

        for local in artists::get_local(&self.pool).await? {
            if token.is_cancelled() {
                return Err(LibraryError::Aborted);
            }

            if let Some(canonical) = artists::find_canonical_by_name(&self.pool, &local.name).await?
            {
                self.supersede(local.id, canonical.id).await?;
                summary.resolved += 1;
                continue;
            }

            match self.lookup.search_exact(&local.name).await {
                Ok(Some(remote)) => {
                    // Canonical artists are unique by channel id; reuse an
                    // existing row when the identity is already known
                    let canonical =
                        match artists::find_by_channel_id(&self.pool, &remote.channel_id).await? {
                            Some(existing) => existing,
                            None => {
                                artists::create(
                                    &self.pool,
                                    CreateArtist {
                                        name: remote.name,
                                        is_local: false,
                                        channel_id: Some(remote.channel_id),
                                        thumbnail_url: remote.thumbnail_url,
                                    },
                                )
                                .await?
                            }
                        };

                    self.supersede(local.id, canonical.id).await?;
                    summary.resolved += 1;
                }
                Ok(None) => {
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(artist = %local.name, error = %e, "artist lookup failed");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            resolved = summary.resolved,
            skipped = summary.skipped,
            "identity resolution complete"
        );

        Ok(summary)
    }

    async fn supersede(&self, local_id: i64, canonical_id: i64) -> Result<()> {
        artists::swap_references(&self.pool, local_id, canonical_id).await?;
        artists::delete(&self.pool, local_id).await?;
        Ok(())
    }
}
