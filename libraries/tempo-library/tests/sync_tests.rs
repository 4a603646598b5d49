//! Integration tests for the catalog sync reconciler.

use tempo_core::types::CreateTrack;
use tempo_library::{LibraryError, LibrarySync, ScanOptions, SyncPhase};
use tempo_storage::{artists, formats, genres, stats, tracks};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use test_helpers::{audio_file, candidate, StubProvider, TestDb};

fn options_for(root: &std::path::Path) -> ScanOptions {
    let mut options = ScanOptions::with_roots(vec![root.to_path_buf()]);
    options.max_parallel = 2;
    options
}

async fn seed_track(
    pool: &sqlx::SqlitePool,
    title: &str,
    local_path: Option<&str>,
) -> tempo_core::types::Track {
    tracks::insert_full(
        pool,
        CreateTrack {
            title: title.to_string(),
            duration_seconds: Some(120.0),
            local_path: local_path.map(|p| p.to_string()),
            is_local: true,
            modified_at: None,
            album_id: None,
            year: None,
        },
        None,
        &[],
        &[],
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn additive_sync_inserts_unknown_tracks() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let a = audio_file(music.path(), "a.mp3");
    let b = audio_file(music.path(), "sub/b.mp3");

    let provider = StubProvider::new()
        .with(candidate("Alpha", &a, &["Artist One"]))
        .with(candidate("Beta", &b, &["Artist Two"]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.total_files, 2);

    let all = tracks::get_all(db.pool()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|t| t.is_enabled()));

    // Artists were synthesized as local placeholders
    let locals = artists::get_local(db.pool()).await.unwrap();
    assert_eq!(locals.len(), 2);
}

#[tokio::test]
async fn additive_sync_never_shrinks_catalog() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    // A row unrelated to the scanned root survives (disabled, not deleted)
    seed_track(db.pool(), "Elsewhere", Some("/nonexistent/elsewhere.mp3")).await;
    let before = tracks::get_all(db.pool()).await.unwrap().len();

    let a = audio_file(music.path(), "a.mp3");
    let provider = StubProvider::new().with(candidate("Alpha", &a, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    sync.additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    let after = tracks::get_all(db.pool()).await.unwrap();
    assert!(after.len() >= before);
    assert!(after.iter().any(|t| t.title == "Elsewhere" && !t.is_enabled()));
}

#[tokio::test]
async fn additive_sync_adopts_membership_null_row_in_place() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let x = audio_file(music.path(), "x.mp3");
    let seeded = seed_track(db.pool(), "X", Some(&x.display().to_string())).await;
    tracks::disable(db.pool(), seeded.id).await.unwrap();

    let provider = StubProvider::new().with(candidate("X", &x, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 1);

    // Same row, membership restored, no new row inserted
    let all = tracks::get_all(db.pool()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, seeded.id);
    assert!(all[0].is_enabled());
}

#[tokio::test]
async fn additive_sync_leaves_fully_synced_rows_untouched() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let x = audio_file(music.path(), "x.mp3");
    let seeded = seed_track(db.pool(), "Original Title", Some(&x.display().to_string())).await;

    // The file now carries different tags; additive must not clobber
    let provider = StubProvider::new().with(candidate("Retagged Title", &x, &["Someone"]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 0);

    let track = tracks::get_by_id(db.pool(), seeded.id).await.unwrap().unwrap();
    assert_eq!(track.title, "Original Title");
}

#[tokio::test]
async fn full_sync_overwrites_metadata_and_rebuilds_links() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let x = audio_file(music.path(), "x.mp3");
    let old_artist = artists::create(db.pool(), tempo_core::types::CreateArtist::local("Old Artist"))
        .await
        .unwrap();
    let seeded = tracks::insert_full(
        db.pool(),
        CreateTrack {
            title: "Old Title".to_string(),
            duration_seconds: Some(90.0),
            local_path: Some(x.display().to_string()),
            is_local: true,
            modified_at: None,
            album_id: None,
            year: None,
        },
        None,
        &[old_artist.id],
        &[],
    )
    .await
    .unwrap();

    let mut retagged = candidate("New Title", &x, &["New Artist"]);
    retagged.genres = vec!["Ambient".to_string()];
    retagged.format = Some(tempo_core::types::FormatRecord {
        container: "mp3".to_string(),
        bitrate: Some(320),
        sample_rate: Some(44_100),
        channels: Some(2),
        content_length: Some(10),
    });

    let provider = StubProvider::new().with(retagged);
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .full_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 0);

    let track = tracks::get_by_id(db.pool(), seeded.id).await.unwrap().unwrap();
    assert_eq!(track.title, "New Title");
    assert_eq!(track.id, seeded.id);

    let names = artists::names_for_track(db.pool(), seeded.id).await.unwrap();
    assert_eq!(names, vec!["New Artist".to_string()]);

    let genre_names = genres::names_for_track(db.pool(), seeded.id).await.unwrap();
    assert_eq!(genre_names, vec!["Ambient".to_string()]);

    let format = formats::get_by_track(db.pool(), seeded.id).await.unwrap().unwrap();
    assert_eq!(format.bitrate, Some(320));
}

#[tokio::test]
async fn full_sync_twice_is_idempotent() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let a = audio_file(music.path(), "a.mp3");
    let b = audio_file(music.path(), "b.mp3");

    let build_provider = || {
        StubProvider::new()
            .with(candidate("Alpha", &a, &["Shared Artist"]))
            .with(candidate("Beta", &b, &["Shared Artist"]))
    };

    let sync = LibrarySync::new(db.pool().clone(), Arc::new(build_provider()));
    sync.full_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    let tracks_after_first = tracks::get_all(db.pool()).await.unwrap();
    let artists_after_first = artists::get_all(db.pool()).await.unwrap();

    let sync = LibrarySync::new(db.pool().clone(), Arc::new(build_provider()));
    sync.full_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    let tracks_after_second = tracks::get_all(db.pool()).await.unwrap();
    let artists_after_second = artists::get_all(db.pool()).await.unwrap();

    assert_eq!(tracks_after_first.len(), tracks_after_second.len());
    assert_eq!(artists_after_first.len(), artists_after_second.len());

    let ids_first: Vec<i64> = tracks_after_first.iter().map(|t| t.id).collect();
    let ids_second: Vec<i64> = tracks_after_second.iter().map(|t| t.id).collect();
    assert_eq!(ids_first, ids_second);
}

#[tokio::test]
async fn finalize_disables_tracks_with_dead_paths() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let seeded = seed_track(db.pool(), "Ghost", Some("/nonexistent/ghost.mp3")).await;
    assert!(seeded.is_enabled());

    let provider = StubProvider::new();
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.disabled, 1);
    let track = tracks::get_by_id(db.pool(), seeded.id).await.unwrap().unwrap();
    assert!(!track.is_enabled());
    assert_eq!(track.local_path.as_deref(), Some("/nonexistent/ghost.mp3"));
}

#[tokio::test]
async fn finalize_prunes_duplicates_keeping_highest_play_count() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let dup = audio_file(music.path(), "dup.mp3");
    let dup_path = dup.display().to_string();

    let loser = seed_track(db.pool(), "Dup", Some(&dup_path)).await;
    let winner = seed_track(db.pool(), "Dup", Some(&dup_path)).await;

    for _ in 0..5 {
        stats::increment_play_count(db.pool(), loser.id).await.unwrap();
    }
    for _ in 0..12 {
        stats::increment_play_count(db.pool(), winner.id).await.unwrap();
    }

    let provider = StubProvider::new().with(candidate("Dup", &dup, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pruned, 1);

    let remaining = tracks::get_all(db.pool()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, winner.id);

    // The live file still has exactly one catalog row
    assert!(tracks::find_by_path(db.pool(), &dup_path)
        .await
        .unwrap()
        .is_some());

    // No two remaining rows share a non-null path
    assert!(tracks::duplicates_by_path(db.pool()).await.unwrap().is_empty());
}

#[tokio::test]
async fn finalize_merges_duplicate_local_artists() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let survivor = artists::create(db.pool(), tempo_core::types::CreateArtist::local("Shadow"))
        .await
        .unwrap();
    let superseded = artists::create(db.pool(), tempo_core::types::CreateArtist::local("Shadow"))
        .await
        .unwrap();

    let a = audio_file(music.path(), "a.mp3");
    let b = audio_file(music.path(), "b.mp3");
    tracks::insert_full(
        db.pool(),
        CreateTrack {
            title: "Alpha".to_string(),
            duration_seconds: None,
            local_path: Some(a.display().to_string()),
            is_local: true,
            modified_at: None,
            album_id: None,
            year: None,
        },
        None,
        &[survivor.id],
        &[],
    )
    .await
    .unwrap();
    let track_b = tracks::insert_full(
        db.pool(),
        CreateTrack {
            title: "Beta".to_string(),
            duration_seconds: None,
            local_path: Some(b.display().to_string()),
            is_local: true,
            modified_at: None,
            album_id: None,
            year: None,
        },
        None,
        &[superseded.id],
        &[],
    )
    .await
    .unwrap();

    let provider = StubProvider::new()
        .with(candidate("Alpha", &a, &[]))
        .with(candidate("Beta", &b, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.merged_artists, 1);
    assert!(artists::get_by_id(db.pool(), superseded.id)
        .await
        .unwrap()
        .is_none());

    // The superseded artist's track now points at the survivor
    let names = artists::names_for_track(db.pool(), track_b.id).await.unwrap();
    assert_eq!(names, vec!["Shadow".to_string()]);
}

#[tokio::test]
async fn cancelled_token_aborts_before_any_write() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let a = audio_file(music.path(), "a.mp3");
    let provider = StubProvider::new().with(candidate("Alpha", &a, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let token = CancellationToken::new();
    token.cancel();

    let result = sync.additive_sync(&options_for(music.path()), &token).await;
    assert!(matches!(result, Err(LibraryError::Aborted)));
    assert_eq!(sync.status().phase(), SyncPhase::Cancelled);
    assert!(sync.status().is_finished());

    // Nothing was committed
    assert!(tracks::get_all(db.pool()).await.unwrap().is_empty());

    // The gate was released; the next operation may start
    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.inserted, 1);
}

#[tokio::test]
async fn concurrent_sync_is_rejected_with_typed_error() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let provider = StubProvider::new();
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let gate = sync.gate();
    let _session = gate.begin().unwrap();

    let result = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(LibraryError::AlreadyActive)));
}

#[tokio::test]
async fn progress_counters_reset_and_accumulate() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    let a = audio_file(music.path(), "a.mp3");
    let b = audio_file(music.path(), "b.mp3");
    let provider = StubProvider::new()
        .with(candidate("Alpha", &a, &[]))
        .with(candidate("Beta", &b, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let status = sync.status();
    sync.additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(status.discovered(), 2);
    assert_eq!(status.processed(), 2);
    assert!(status.is_finished());
    assert!(!status.is_active());
    assert_eq!(status.phase(), SyncPhase::Idle);
}

#[tokio::test]
async fn in_batch_duplicates_collapse_to_one_row() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    // Two files whose tags claim the same title and artist set
    let a = audio_file(music.path(), "a.mp3");
    let b = audio_file(music.path(), "copy/a2.mp3");
    let provider = StubProvider::new()
        .with(candidate("Same Song", &a, &["One Artist"]))
        .with(candidate("Same Song", &b, &["one artist"]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(
        tracks::search_by_title(db.pool(), "Same Song")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn unrelated_path_types_do_not_collide() {
    let db = TestDb::new().await;
    let music = tempfile::tempdir().unwrap();

    // A detached row (no path) with a matching title gets adopted rather
    // than duplicated
    let seeded = seed_track(db.pool(), "Floating", None).await;
    tracks::disable(db.pool(), seeded.id).await.unwrap();

    let a = audio_file(music.path(), "floating.mp3");
    let provider = StubProvider::new().with(candidate("Floating", &a, &[]));
    let sync = LibrarySync::new(db.pool().clone(), Arc::new(provider));

    let summary = sync
        .additive_sync(&options_for(music.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 1);

    let track = tracks::get_by_id(db.pool(), seeded.id).await.unwrap().unwrap();
    assert_eq!(
        track.local_path.as_deref(),
        Some(a.display().to_string().as_str())
    );
    assert!(track.is_enabled());
}

#[tokio::test]
async fn scan_options_roundtrip_through_serde() {
    let options = ScanOptions {
        include_roots: vec![PathBuf::from("/music")],
        exclude_roots: vec![PathBuf::from("/music/podcasts")],
        paths_only: false,
        match_level: tempo_core::types::MatchLevel::TitleArtistsAlbum,
        strict_filename: true,
        max_parallel: 4,
    };

    let json = serde_json::to_string(&options).unwrap();
    let parsed: ScanOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.include_roots, options.include_roots);
    assert_eq!(parsed.match_level, options.match_level);
    assert!(parsed.strict_filename);
}
