//! Scan orchestrator.
//!
//! Walks the whitelisted roots (minus exclusions), dispatches metadata
//! extraction onto a bounded blocking pool, tracks progress, and honors
//! cooperative cancellation at every checkpoint. Extraction tasks never
//! touch the catalog.

use crate::error::{LibraryError, Result};
use crate::options::ScanOptions;
use crate::status::ScanStatus;
use crate::tree::DirectoryTree;
use tempo_core::types::TrackCandidate;
use tempo_metadata::MetadataProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

/// Supported audio file extensions
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac"];

/// Sidecar files that always get skipped (lyrics)
const SIDECAR_EXTENSIONS: &[&str] = &["lrc"];

/// Completed extractions are reported to the status counters in batches
/// of this size to bound update overhead.
const DISCOVERY_REPORT_BATCH: u64 = 50;

/// Result of one scan pass.
#[derive(Debug)]
pub enum ScanOutcome {
    /// Paths-only mode: the registered directory shape
    PathsIndexed(DirectoryTree),

    /// Extracted candidates, in stable input order
    Extracted(Vec<TrackCandidate>),
}

/// A discovered file together with the include root it came from.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub root: PathBuf,
    pub path: PathBuf,
}

/// Scan orchestrator over a pluggable extraction backend.
pub struct Scanner<P> {
    provider: Arc<P>,
    status: Arc<ScanStatus>,
}

impl<P: MetadataProvider + 'static> Scanner<P> {
    pub fn new(provider: Arc<P>, status: Arc<ScanStatus>) -> Self {
        Self { provider, status }
    }

    /// Run a standalone scan: paths-only indexing or full extraction,
    /// with status transitions handled here.
    pub async fn scan(&self, options: &ScanOptions, token: &CancellationToken) -> Result<ScanOutcome> {
        self.status.begin();
        let result = self.scan_inner(options, token).await;

        match &result {
            Err(e) if e.is_aborted() => self.status.cancel(),
            _ => self.status.complete(),
        }

        result
    }

    async fn scan_inner(
        &self,
        options: &ScanOptions,
        token: &CancellationToken,
    ) -> Result<ScanOutcome> {
        let entries = self.collect_entries(options)?;

        if options.paths_only {
            let mut tree = DirectoryTree::new();
            for entry in &entries {
                if token.is_cancelled() {
                    return Err(LibraryError::Aborted);
                }
                let relative = entry.path.strip_prefix(&entry.root).unwrap_or(&entry.path);
                tree.insert_path(relative);
            }
            return Ok(ScanOutcome::PathsIndexed(tree));
        }

        let files: Vec<PathBuf> = entries.into_iter().map(|e| e.path).collect();
        let candidates = self
            .extract_all(files, options.max_parallel, token)
            .await?;

        Ok(ScanOutcome::Extracted(candidates))
    }

    /// Enumerate the effective file set: every audio file under every
    /// include root, minus files under an exclude root, minus sidecars.
    /// Include roots that are themselves inside an exclude root are
    /// dropped wholesale.
    pub fn collect_entries(&self, options: &ScanOptions) -> Result<Vec<ScannedFile>> {
        let excludes: Vec<PathBuf> = options
            .exclude_roots
            .iter()
            .map(|p| p.canonicalize().unwrap_or_else(|_| p.clone()))
            .collect();

        let mut entries = Vec::new();

        for root in &options.include_roots {
            let resolved_root = root.canonicalize().unwrap_or_else(|_| root.clone());

            if excludes.iter().any(|ex| resolved_root.starts_with(ex)) {
                tracing::debug!(
                    root = %root.display(),
                    "include root lies inside an exclude root, skipping"
                );
                continue;
            }

            if !resolved_root.is_dir() {
                tracing::warn!(root = %root.display(), "include root is not a directory, skipping");
                continue;
            }

            for entry in WalkDir::new(&resolved_root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();

                if !entry.file_type().is_file() {
                    continue;
                }
                if is_sidecar_file(path) || !is_audio_file(path) {
                    continue;
                }
                if excludes.iter().any(|ex| path.starts_with(ex)) {
                    continue;
                }

                entries.push(ScannedFile {
                    root: resolved_root.clone(),
                    path: path.to_path_buf(),
                });
            }
        }

        Ok(entries)
    }

    /// Paths of the effective file set.
    pub fn collect_files(&self, options: &ScanOptions) -> Result<Vec<PathBuf>> {
        Ok(self
            .collect_entries(options)?
            .into_iter()
            .map(|e| e.path)
            .collect())
    }

    /// Extract candidates for every file under bounded concurrency.
    ///
    /// The cancellation token is checked before each task is submitted
    /// and again inside each task; observing it aborts the whole batch.
    /// `NotPlayable` files are skipped silently; any other extraction
    /// failure is fatal to the batch. Results come back in stable input
    /// order.
    pub async fn extract_all(
        &self,
        files: Vec<PathBuf>,
        max_parallel: usize,
        token: &CancellationToken,
    ) -> Result<Vec<TrackCandidate>> {
        if max_parallel == 0 {
            return Err(LibraryError::Unsupported(
                "max_parallel must be at least 1".to_string(),
            ));
        }

        let semaphore = Arc::new(Semaphore::new(max_parallel));
        let mut join_set: JoinSet<(usize, Result<Option<TrackCandidate>>)> = JoinSet::new();
        let total = files.len();

        for (index, path) in files.into_iter().enumerate() {
            if token.is_cancelled() {
                return Err(LibraryError::Aborted);
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| LibraryError::Task(e.to_string()))?;
            let provider = Arc::clone(&self.provider);
            let task_token = token.clone();

            join_set.spawn_blocking(move || {
                let _permit = permit;

                if task_token.is_cancelled() {
                    return (index, Err(LibraryError::Aborted));
                }

                match provider.extract(&path) {
                    Ok(candidate) => (index, Ok(Some(candidate))),
                    Err(e) if e.is_not_playable() => {
                        tracing::debug!(path = %path.display(), "not playable, skipping");
                        (index, Ok(None))
                    }
                    Err(e) => (index, Err(e.into())),
                }
            });
        }

        let mut slots: Vec<Option<TrackCandidate>> = (0..total).map(|_| None).collect();
        let mut since_flush = 0u64;

        while let Some(joined) = join_set.join_next().await {
            let (index, outcome) = joined.map_err(|e| LibraryError::Task(e.to_string()))?;

            match outcome {
                Ok(Some(candidate)) => {
                    slots[index] = Some(candidate);
                    since_flush += 1;
                    if since_flush >= DISCOVERY_REPORT_BATCH {
                        self.status.add_discovered(since_flush);
                        since_flush = 0;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    join_set.abort_all();
                    return Err(e);
                }
            }
        }

        if since_flush > 0 {
            self.status.add_discovered(since_flush);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Check if a file has a supported audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if a file is a sidecar (always skipped)
pub fn is_sidecar_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SIDECAR_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
