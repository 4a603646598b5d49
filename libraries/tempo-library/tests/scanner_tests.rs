//! Integration tests for the scan orchestrator.

use tempo_library::{LibraryError, ScanOptions, ScanOutcome, ScanStatus, Scanner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use test_helpers::{audio_file, candidate, StubProvider};

fn scanner(provider: StubProvider) -> Scanner<StubProvider> {
    Scanner::new(Arc::new(provider), Arc::new(ScanStatus::new()))
}

#[tokio::test]
async fn collect_files_skips_sidecars_and_non_audio() {
    let music = tempfile::tempdir().unwrap();
    audio_file(music.path(), "song.mp3");
    audio_file(music.path(), "nested/track.flac");
    std::fs::write(music.path().join("lyrics.lrc"), b"[00:01] la").unwrap();
    std::fs::write(music.path().join("cover.jpg"), b"img").unwrap();

    let scanner = scanner(StubProvider::new());
    let options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    let files = scanner.collect_files(&options).unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| !f.ends_with("lyrics.lrc")));
}

#[tokio::test]
async fn collect_files_honors_exclude_roots() {
    let music = tempfile::tempdir().unwrap();
    audio_file(music.path(), "keep.mp3");
    audio_file(music.path(), "podcasts/skip.mp3");

    let scanner = scanner(StubProvider::new());
    let mut options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    options.exclude_roots = vec![music.path().join("podcasts")];

    let files = scanner.collect_files(&options).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("keep.mp3"));
}

#[tokio::test]
async fn include_root_inside_exclude_root_is_dropped() {
    let music = tempfile::tempdir().unwrap();
    audio_file(music.path(), "inner/song.mp3");

    let scanner = scanner(StubProvider::new());
    let mut options = ScanOptions::with_roots(vec![music.path().join("inner")]);
    options.exclude_roots = vec![music.path().to_path_buf()];

    let files = scanner.collect_files(&options).unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn extract_all_returns_stable_input_order() {
    let music = tempfile::tempdir().unwrap();
    let a = audio_file(music.path(), "a.mp3");
    let b = audio_file(music.path(), "b.mp3");
    let c = audio_file(music.path(), "c.mp3");

    let provider = StubProvider::new()
        .with(candidate("First", &a, &[]))
        .with(candidate("Second", &b, &[]))
        .with(candidate("Third", &c, &[]));
    let scanner = scanner(provider);

    let options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    let files = scanner.collect_files(&options).unwrap();
    let candidates = scanner
        .extract_all(files, 3, &CancellationToken::new())
        .await
        .unwrap();

    let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn not_playable_files_are_skipped_silently() {
    let music = tempfile::tempdir().unwrap();
    let a = audio_file(music.path(), "a.mp3");
    audio_file(music.path(), "broken.mp3"); // no stub entry -> NotPlayable

    let provider = StubProvider::new().with(candidate("Only One", &a, &[]));
    let scanner = scanner(provider);

    let options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    let files = scanner.collect_files(&options).unwrap();
    let candidates = scanner
        .extract_all(files, 2, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "Only One");
}

#[tokio::test]
async fn cancelled_token_aborts_extraction() {
    let music = tempfile::tempdir().unwrap();
    let a = audio_file(music.path(), "a.mp3");

    let provider = StubProvider::new().with(candidate("Alpha", &a, &[]));
    let scanner = scanner(provider);

    let token = CancellationToken::new();
    token.cancel();

    let options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    let files = scanner.collect_files(&options).unwrap();
    let result = scanner.extract_all(files, 2, &token).await;

    assert!(matches!(result, Err(LibraryError::Aborted)));
}

#[tokio::test]
async fn token_observed_mid_batch_aborts_remaining_work() {
    use tempo_core::types::TrackCandidate;
    use tempo_metadata::MetadataProvider;
    use std::path::Path;

    // Trips the token as soon as the first file is extracted
    struct TrippingProvider {
        token: CancellationToken,
    }

    impl MetadataProvider for TrippingProvider {
        fn extract(&self, path: &Path) -> tempo_metadata::Result<TrackCandidate> {
            self.token.cancel();
            Ok(TrackCandidate::from_path(path))
        }
    }

    let music = tempfile::tempdir().unwrap();
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        audio_file(music.path(), name);
    }

    let token = CancellationToken::new();
    let provider = TrippingProvider {
        token: token.clone(),
    };
    let scanner = Scanner::new(Arc::new(provider), Arc::new(ScanStatus::new()));

    let options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    let files = scanner.collect_files(&options).unwrap();
    assert_eq!(files.len(), 3);

    // Serial execution: the flag trips during file one, the orchestrator
    // must refuse to start the next unit of work
    let result = scanner.extract_all(files, 1, &token).await;
    assert!(matches!(result, Err(LibraryError::Aborted)));
}

#[tokio::test]
async fn zero_parallelism_is_a_configuration_error() {
    let scanner = scanner(StubProvider::new());
    let result = scanner
        .extract_all(Vec::new(), 0, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(LibraryError::Unsupported(_))));
}

#[tokio::test]
async fn paths_only_scan_registers_shape_without_extraction() {
    let music = tempfile::tempdir().unwrap();
    audio_file(music.path(), "artist/album/one.mp3");
    audio_file(music.path(), "artist/album/two.mp3");

    // Provider has no entries; paths-only must not consult it
    let scanner = scanner(StubProvider::new());
    let mut options = ScanOptions::with_roots(vec![music.path().to_path_buf()]);
    options.paths_only = true;

    let outcome = scanner
        .scan(&options, &CancellationToken::new())
        .await
        .unwrap();

    match outcome {
        ScanOutcome::PathsIndexed(tree) => {
            let artist = &tree.root().children["artist"];
            assert!(artist.children.contains_key("album"));
            // paths-only registers shape, not counts
            assert_eq!(tree.root().total_tracks, 0);
        }
        ScanOutcome::Extracted(_) => panic!("expected paths-only outcome"),
    }
}
