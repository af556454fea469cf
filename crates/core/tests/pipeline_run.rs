//! Pipeline lifecycle integration tests.
//!
//! These tests run the full pipeline over a filesystem object store with
//! mock transcoder and segmenter:
//! - fetch -> encode plan -> segmentation -> staged upload -> publication
//! - progress reporting
//! - failure handling and cleanup

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::mpsc;

use chorale_core::{
    testing::{MockSegmenter, MockTranscoder},
    FsObjectStore, JobOutcome, JobProgress, PipelineConfig, StoreConfig, TranscodePipeline,
};

/// Test helper wiring a pipeline over a temp-dir object store.
struct TestHarness {
    pipeline: TranscodePipeline<MockTranscoder, MockSegmenter, FsObjectStore>,
    transcoder: Arc<MockTranscoder>,
    segmenter: Arc<MockSegmenter>,
    storage_root: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage_root = temp_dir.path().join("storage");

        let store = Arc::new(FsObjectStore::new(
            StoreConfig::default().with_root(storage_root.clone()),
        ));
        let transcoder = Arc::new(MockTranscoder::new());
        let segmenter = Arc::new(MockSegmenter::new(245));

        let config = PipelineConfig::default().with_work_dir(temp_dir.path().join("work"));
        let pipeline = TranscodePipeline::from_shared(
            config,
            Arc::clone(&transcoder),
            Arc::clone(&segmenter),
            Arc::clone(&store),
        );

        Self {
            pipeline,
            transcoder,
            segmenter,
            storage_root,
            _temp_dir: temp_dir,
        }
    }

    async fn seed_master(&self, audio_id: &str) {
        let bucket = self.storage_root.join("incoming-audio");
        tokio::fs::create_dir_all(&bucket)
            .await
            .expect("Failed to create incoming bucket");
        tokio::fs::write(bucket.join(audio_id), b"pretend pcm")
            .await
            .expect("Failed to seed master");
    }

    fn final_path(&self, audio_id: &str) -> PathBuf {
        self.storage_root.join("final-audio").join(audio_id)
    }

    fn incoming_path(&self, audio_id: &str) -> PathBuf {
        self.storage_root.join("incoming-audio").join(audio_id)
    }

    fn work_path(&self, audio_id: &str) -> PathBuf {
        self._temp_dir.path().join("work").join(audio_id)
    }

    async fn final_keys(&self, audio_id: &str) -> Vec<String> {
        let dir = self.final_path(audio_id);
        if !dir.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = std::fs::read_dir(&dir)
            .expect("Failed to read final dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

#[tokio::test]
async fn test_full_run_publishes_complete_derivative_set() {
    let harness = TestHarness::new();
    harness.seed_master("abc123").await;

    let outcome = harness.pipeline.execute("abc123", "wav", None).await;
    assert!(
        matches!(outcome, JobOutcome::Completed { duration_secs: 245 }),
        "unexpected outcome: {:?}",
        outcome
    );

    let keys = harness.final_keys("abc123").await;
    assert_eq!(
        keys,
        vec![
            "generated.128.mp3",
            "generated.256.mp3",
            "generated.320.mp3",
            "generated.flac",
            "generated.opus",
            "generated.wav",
            "playlist.m3u8",
            "segment-000.ts",
            "segment-001.ts",
            "segment-002.ts",
        ]
    );

    // One encode per plan entry, all against the fetched master.
    let requests = harness.transcoder.recorded_requests().await;
    assert_eq!(requests.len(), 6);
    for request in &requests {
        assert!(request.input_path.ends_with("original.wav"));
    }

    // The master is consumed and the workspace is gone.
    assert!(!harness.incoming_path("abc123").exists());
    assert!(!harness.work_path("abc123").exists());
    // Nothing lingers under the staging prefix.
    assert!(!harness
        .storage_root
        .join("final-audio")
        .join("staging")
        .join("abc123")
        .exists());
}

#[tokio::test]
async fn test_progress_sequence_is_monotone() {
    let harness = TestHarness::new();
    harness.seed_master("abc123").await;

    let (tx, mut rx) = mpsc::channel::<JobProgress>(64);
    let outcome = harness.pipeline.execute("abc123", "wav", Some(tx)).await;
    assert!(outcome.is_completed());

    let mut percents = Vec::new();
    while let Some(update) = rx.recv().await {
        assert_eq!(update.audio_id, "abc123");
        percents.push(update.percent);
    }

    assert_eq!(percents.first(), Some(&10));
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.contains(&90));
    assert!(percents.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_encode_failure_publishes_nothing_and_keeps_master() {
    let harness = TestHarness::new();
    harness.seed_master("abc123").await;
    harness.transcoder.fail_format("mp3@256").await;

    let outcome = harness.pipeline.execute("abc123", "wav", None).await;
    match outcome {
        JobOutcome::Failed { error } => assert!(error.contains("mp3@256"), "error: {}", error),
        other => panic!("expected failure, got {:?}", other),
    }

    // Nothing reached the canonical prefix or survived under staging.
    assert!(harness.final_keys("abc123").await.is_empty());
    assert!(!harness
        .storage_root
        .join("final-audio")
        .join("staging")
        .join("abc123")
        .exists());

    // The master stays put for a retry after the bug is fixed.
    assert!(harness.incoming_path("abc123").exists());
    assert!(!harness.work_path("abc123").exists());
}

#[tokio::test]
async fn test_segmentation_failure_fails_the_job() {
    let harness = TestHarness::new();
    harness.seed_master("abc123").await;
    harness.segmenter.fail();

    let outcome = harness.pipeline.execute("abc123", "wav", None).await;
    assert!(!outcome.is_completed());
    assert!(harness.final_keys("abc123").await.is_empty());
    assert!(harness.incoming_path("abc123").exists());
}

#[tokio::test]
async fn test_rerun_replaces_previous_derivatives() {
    let harness = TestHarness::new();

    harness.seed_master("abc123").await;
    assert!(harness
        .pipeline
        .execute("abc123", "wav", None)
        .await
        .is_completed());
    let first = harness.final_keys("abc123").await;

    // A re-upload of the same track runs the pipeline again.
    harness.seed_master("abc123").await;
    assert!(harness
        .pipeline
        .execute("abc123", "wav", None)
        .await
        .is_completed());
    let second = harness.final_keys("abc123").await;

    assert_eq!(first, second);
    assert_eq!(
        harness.transcoder.recorded_requests().await.len(),
        12,
        "both runs should encode the full plan"
    );
}

#[tokio::test]
async fn test_configured_bucket_names_are_honored() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage_root = temp_dir.path().join("storage");

    let store = Arc::new(FsObjectStore::new(
        StoreConfig::default().with_root(storage_root.clone()),
    ));
    let config = PipelineConfig::default()
        .with_work_dir(temp_dir.path().join("work"))
        .with_incoming_bucket("uploads")
        .with_final_bucket("published");
    let pipeline = TranscodePipeline::from_shared(
        config,
        Arc::new(MockTranscoder::new()),
        Arc::new(MockSegmenter::new(245)),
        store,
    );

    let bucket = storage_root.join("uploads");
    tokio::fs::create_dir_all(&bucket)
        .await
        .expect("Failed to create incoming bucket");
    tokio::fs::write(bucket.join("abc123"), b"pretend pcm")
        .await
        .expect("Failed to seed master");

    let outcome = pipeline.execute("abc123", "wav", None).await;
    assert!(outcome.is_completed(), "unexpected outcome: {:?}", outcome);

    // The fetch read from the configured bucket and the set landed in the
    // configured final bucket.
    assert!(!bucket.join("abc123").exists());
    assert!(storage_root
        .join("published")
        .join("abc123")
        .join("playlist.m3u8")
        .exists());
}

#[tokio::test]
async fn test_missing_master_fails_cleanly() {
    let harness = TestHarness::new();

    let outcome = harness.pipeline.execute("ghost", "flac", None).await;
    match outcome {
        JobOutcome::Failed { error } => assert!(error.contains("ghost")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(harness.transcoder.recorded_requests().await.is_empty());
}
