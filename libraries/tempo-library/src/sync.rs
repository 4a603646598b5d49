//! Catalog sync reconciler.
//!
//! Takes a batch of extracted candidates and reconciles it against the
//! persistent catalog: insert unknown tracks, conditionally refresh
//! known ones, relink artist/genre associations, then finalize by
//! disabling unreachable entries and merging duplicates.
//!
//! All catalog mutation is serialized behind [`SyncGate`]: at most one
//! sync-family operation may be active catalog-wide, and a second
//! `begin` is rejected with a typed error instead of queueing.

use crate::error::{LibraryError, Result};
use crate::matcher::{dedup_candidates, same_track};
use crate::options::ScanOptions;
use crate::scanner::Scanner;
use crate::status::{ScanStatus, SyncPhase};
use tempo_core::types::{
    ArtistId, CreateArtist, CreateGenre, CreateTrack, GenreId, MatchLevel, Track, TrackCandidate,
};
use tempo_metadata::MetadataProvider;
use tempo_storage::tracks::RefreshTrack;
use tempo_storage::{albums, artists, genres, tracks};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Processed-row progress is pushed to the status counters in batches
/// of this size.
const SYNC_REPORT_BATCH: u64 = 10;

/// The single-writer gate for catalog-mutating operations.
#[derive(Debug, Default)]
pub struct SyncGate {
    active: AtomicBool,
}

impl SyncGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the gate. Fail-fast: a second concurrent claim gets
    /// [`LibraryError::AlreadyActive`], it is never queued.
    pub fn begin(self: &Arc<Self>) -> Result<SyncSession> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LibraryError::AlreadyActive);
        }

        Ok(SyncSession {
            gate: Arc::clone(self),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Proof of gate ownership; releases the gate on drop.
#[derive(Debug)]
pub struct SyncSession {
    gate: Arc<SyncGate>,
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.gate.active.store(false, Ordering::Release);
    }
}

/// Statistics from one sync operation.
#[derive(Debug, Default, Clone)]
pub struct SyncSummary {
    pub total_files: usize,
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub disabled: usize,
    pub pruned: usize,
    pub merged_artists: usize,
}

/// The catalog sync engine.
pub struct LibrarySync<P> {
    pool: SqlitePool,
    scanner: Scanner<P>,
    gate: Arc<SyncGate>,
    status: Arc<ScanStatus>,
}

impl<P: MetadataProvider + 'static> LibrarySync<P> {
    pub fn new(pool: SqlitePool, provider: Arc<P>) -> Self {
        let status = Arc::new(ScanStatus::new());
        Self {
            scanner: Scanner::new(provider, Arc::clone(&status)),
            pool,
            gate: Arc::new(SyncGate::new()),
            status,
        }
    }

    /// Observable progress counters.
    pub fn status(&self) -> Arc<ScanStatus> {
        Arc::clone(&self.status)
    }

    /// The single-writer gate, shared with the identity resolver.
    pub fn gate(&self) -> Arc<SyncGate> {
        Arc::clone(&self.gate)
    }

    /// Quick incremental sync.
    ///
    /// Enumerates the roots, filters out files already represented by a
    /// fully-synced catalog row (strict-filename is ignored for this
    /// pre-filter), extracts full metadata only for the remaining delta,
    /// reconciles without overwriting existing rows, then finalizes.
    pub async fn additive_sync(
        &self,
        options: &ScanOptions,
        token: &CancellationToken,
    ) -> Result<SyncSummary> {
        let session = self.gate.begin()?;
        self.status.begin();

        let result = self.additive_sync_inner(options, token).await;
        self.settle(session, &result);
        result
    }

    /// Full rescan.
    ///
    /// Extracts full metadata for every discovered file and reconciles
    /// with the refresh flag set: stored metadata is overwritten and
    /// artist/genre links are destroyed and rebuilt. Finalize runs at
    /// the end like in the additive path.
    pub async fn full_sync(
        &self,
        options: &ScanOptions,
        token: &CancellationToken,
    ) -> Result<SyncSummary> {
        let session = self.gate.begin()?;
        self.status.begin();

        let result = self.full_sync_inner(options, token).await;
        self.settle(session, &result);
        result
    }

    fn settle(&self, session: SyncSession, result: &Result<SyncSummary>) {
        match result {
            Ok(summary) => {
                tracing::info!(
                    total = summary.total_files,
                    inserted = summary.inserted,
                    updated = summary.updated,
                    disabled = summary.disabled,
                    pruned = summary.pruned,
                    merged_artists = summary.merged_artists,
                    "sync complete"
                );
                self.status.complete();
            }
            Err(e) if e.is_aborted() => {
                tracing::info!("sync cancelled");
                self.status.cancel();
            }
            Err(e) => {
                tracing::error!(error = %e, "sync failed");
                self.status.complete();
            }
        }
        drop(session);
    }

    async fn additive_sync_inner(
        &self,
        options: &ScanOptions,
        token: &CancellationToken,
    ) -> Result<SyncSummary> {
        let files = self.scanner.collect_files(options)?;
        let seen_paths = path_set(&files);

        // Cheap pre-filter: keep only files with no fully-synced catalog
        // counterpart. Strict-filename is deliberately not applied here.
        let mut delta = Vec::new();
        for file in &files {
            if token.is_cancelled() {
                return Err(LibraryError::Aborted);
            }

            let probe = TrackCandidate::from_path(file);
            let synced = self
                .find_catalog_match(&probe, options.match_level, false, true)
                .await?
                .is_some();
            if !synced {
                delta.push(file.clone());
            }
        }

        let extracted = self
            .scanner
            .extract_all(delta, options.max_parallel, token)
            .await?;
        let batch = dedup_candidates(extracted, options.match_level, options.strict_filename);

        self.status.enter_phase(SyncPhase::Syncing);
        let mut summary = self.sync_batch(&batch, options, false, token).await?;
        summary.total_files = files.len();

        self.status.enter_phase(SyncPhase::Finalizing);
        self.finalize(&seen_paths, token, &mut summary).await?;

        Ok(summary)
    }

    async fn full_sync_inner(
        &self,
        options: &ScanOptions,
        token: &CancellationToken,
    ) -> Result<SyncSummary> {
        let files = self.scanner.collect_files(options)?;
        let seen_paths = path_set(&files);

        let extracted = self
            .scanner
            .extract_all(files.clone(), options.max_parallel, token)
            .await?;
        let batch = dedup_candidates(extracted, options.match_level, options.strict_filename);

        self.status.enter_phase(SyncPhase::Syncing);
        let mut summary = self.sync_batch(&batch, options, true, token).await?;
        summary.total_files = files.len();

        self.status.enter_phase(SyncPhase::Finalizing);
        self.finalize(&seen_paths, token, &mut summary).await?;

        Ok(summary)
    }

    /// The shared per-candidate reconciliation routine.
    ///
    /// Candidates are processed in stable input order; every catalog
    /// write for one track happens inside a single transaction, so
    /// cancellation between rows never leaves a half-written track.
    async fn sync_batch(
        &self,
        batch: &[TrackCandidate],
        options: &ScanOptions,
        refresh: bool,
        token: &CancellationToken,
    ) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();
        let mut since_flush = 0u64;

        for candidate in batch {
            if token.is_cancelled() {
                return Err(LibraryError::Aborted);
            }

            let matched = self
                .find_catalog_match(
                    candidate,
                    options.match_level,
                    options.strict_filename,
                    false,
                )
                .await?;

            match matched {
                Some(track) => {
                    if refresh {
                        self.refresh_track(&track, candidate).await?;
                        summary.updated += 1;
                    } else if track.added_at.is_none() || track.local_path.is_none() {
                        // Only rows not yet fully synced may be touched
                        tracks::adopt(
                            &self.pool,
                            track.id,
                            &candidate.path.display().to_string(),
                            candidate.modified_at,
                        )
                        .await?;
                        summary.updated += 1;
                    }
                }
                None => {
                    self.insert_track(candidate).await?;
                    summary.inserted += 1;
                }
            }

            summary.processed += 1;
            since_flush += 1;
            if since_flush >= SYNC_REPORT_BATCH {
                self.status.add_processed(since_flush);
                since_flush = 0;
            }
        }

        if since_flush > 0 {
            self.status.add_processed(since_flush);
        }

        Ok(summary)
    }

    /// Search the catalog for a track this candidate denotes.
    ///
    /// The identical-path short-circuit applies at levels 2 and 3 even
    /// when the stored title has drifted from the tags. With
    /// `only_synced`, rows with a null membership or path do not count
    /// as matches (they stay in the additive delta to be adopted).
    async fn find_catalog_match(
        &self,
        candidate: &TrackCandidate,
        level: MatchLevel,
        strict_filename: bool,
        only_synced: bool,
    ) -> Result<Option<Track>> {
        let synced = |track: &Track| track.added_at.is_some() && track.local_path.is_some();

        if level >= MatchLevel::TitleArtists {
            let path = candidate.path.display().to_string();
            if let Some(track) = tracks::find_by_path(&self.pool, &path).await? {
                if !only_synced || synced(&track) {
                    return Ok(Some(track));
                }
            }
        }

        for track in tracks::search_by_title(&self.pool, &candidate.title).await? {
            let facts = self.track_facts(&track).await?;
            if same_track(candidate, &facts, level, strict_filename) {
                if only_synced && !synced(&track) {
                    continue;
                }
                return Ok(Some(track));
            }
        }

        Ok(None)
    }

    /// Candidate-shaped view of a catalog track, for the matcher.
    async fn track_facts(&self, track: &Track) -> Result<TrackCandidate> {
        let artists = artists::names_for_track(&self.pool, track.id).await?;
        let album = albums::title_for_track(&self.pool, track.id).await?;

        Ok(TrackCandidate {
            title: track.title.clone(),
            duration_seconds: track.duration_seconds,
            album,
            year: track.year,
            artists,
            genres: Vec::new(),
            path: track
                .local_path
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_default(),
            modified_at: track.modified_at,
            format: None,
        })
    }

    async fn insert_track(&self, candidate: &TrackCandidate) -> Result<()> {
        let artist_ids = self.resolve_artists(&candidate.artists).await?;
        let genre_ids = self.resolve_genres(&candidate.genres).await?;
        let album_id = self.resolve_album(candidate).await?;

        tracks::insert_full(
            &self.pool,
            CreateTrack {
                title: candidate.title.clone(),
                duration_seconds: candidate.duration_seconds,
                local_path: Some(candidate.path.display().to_string()),
                is_local: true,
                modified_at: candidate.modified_at,
                album_id,
                year: candidate.year,
            },
            candidate.format.as_ref(),
            &artist_ids,
            &genre_ids,
        )
        .await?;

        Ok(())
    }

    async fn refresh_track(&self, track: &Track, candidate: &TrackCandidate) -> Result<()> {
        let artist_ids = self.resolve_artists(&candidate.artists).await?;
        let genre_ids = self.resolve_genres(&candidate.genres).await?;
        let album_id = self.resolve_album(candidate).await?;

        tracks::apply_refresh(
            &self.pool,
            track.id,
            &RefreshTrack {
                title: candidate.title.clone(),
                duration_seconds: candidate.duration_seconds,
                local_path: Some(candidate.path.display().to_string()),
                modified_at: candidate.modified_at,
                album_id,
                year: candidate.year,
            },
            candidate.format.as_ref(),
            &artist_ids,
            &genre_ids,
        )
        .await?;

        Ok(())
    }

    /// Match each artist name against the catalog by the closest-name
    /// heuristic, inserting a new local (provisional) artist on a miss.
    async fn resolve_artists(&self, names: &[String]) -> Result<Vec<ArtistId>> {
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            let id = match artists::find_closest_by_name(&self.pool, name).await? {
                Some(artist) => artist.id,
                None => artists::create(&self.pool, CreateArtist::local(name)).await?.id,
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    async fn resolve_genres(&self, names: &[String]) -> Result<Vec<GenreId>> {
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            let id = match genres::find_closest_by_name(&self.pool, name).await? {
                Some(genre) => genre.id,
                None => {
                    genres::create(
                        &self.pool,
                        CreateGenre {
                            name: name.clone(),
                        },
                    )
                    .await?
                    .id
                }
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    async fn resolve_album(&self, candidate: &TrackCandidate) -> Result<Option<i64>> {
        match &candidate.album {
            Some(title) => Ok(Some(
                albums::get_or_create(&self.pool, title, candidate.year).await?,
            )),
            None => Ok(None),
        }
    }

    /// The post-sync pass:
    /// (a) disable tracks whose local path no longer resolves to a file;
    /// (b) disable local tracks whose path was not seen by this scan;
    /// (c) prune duplicate rows sharing one path, keeping the highest
    ///     lifetime play count (the single place hard deletion is
    ///     allowed);
    /// (d) merge duplicate local artists onto the earliest-created one.
    pub async fn finalize(
        &self,
        seen_paths: &HashSet<String>,
        token: &CancellationToken,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        if token.is_cancelled() {
            return Err(LibraryError::Aborted);
        }

        for track in tracks::get_all_local(&self.pool).await? {
            let Some(path) = track.local_path.as_deref() else {
                continue;
            };
            if !track.is_enabled() {
                continue;
            }

            let missing = !Path::new(path).exists();
            let unseen = !seen_paths.contains(path);

            if missing || unseen {
                tracing::debug!(track_id = track.id, path = %path, missing, "disabling track");
                tracks::disable(&self.pool, track.id).await?;
                summary.disabled += 1;
            }
        }

        for (path, ids) in tracks::duplicates_by_path(&self.pool).await? {
            let mut survivor = ids[0];
            let mut best_count = tempo_storage::stats::play_count(&self.pool, survivor).await?;

            for &id in &ids[1..] {
                let count = tempo_storage::stats::play_count(&self.pool, id).await?;
                if count > best_count {
                    survivor = id;
                    best_count = count;
                }
            }

            for &id in &ids {
                if id != survivor {
                    tracing::debug!(track_id = id, path = %path, "pruning duplicate track");
                    tracks::delete(&self.pool, id).await?;
                    summary.pruned += 1;
                }
            }
        }

        for group in artists::duplicate_local_groups(&self.pool).await? {
            let survivor = &group[0];
            for superseded in &group[1..] {
                tracing::debug!(
                    from = superseded.id,
                    to = survivor.id,
                    name = %survivor.name,
                    "merging duplicate local artist"
                );
                artists::swap_references(&self.pool, superseded.id, survivor.id).await?;
                artists::delete(&self.pool, superseded.id).await?;
                summary.merged_artists += 1;
            }
        }

        Ok(())
    }
}

fn path_set(files: &[PathBuf]) -> HashSet<String> {
    files.iter().map(|p| p.display().to_string()).collect()
}
