//! Queue and worker lifecycle integration tests.
//!
//! These tests verify the path from enqueue to terminal outcome:
//! - worker drains the queue through the pipeline
//! - progress lands on the job record
//! - terminal outcomes reach the track status sink

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use chorale_core::{
    testing::{MockSegmenter, MockTrackSink, MockTranscoder},
    FsObjectStore, JobPayload, JobState, LifecycleObserver, MemoryJobQueue, PipelineConfig,
    StoreConfig, TranscodePipeline, TranscodeWorker, WorkerConfig,
};

struct TestHarness {
    queue: Arc<MemoryJobQueue>,
    worker: TranscodeWorker<MockTranscoder, MockSegmenter, FsObjectStore>,
    sink: Arc<MockTrackSink>,
    transcoder: Arc<MockTranscoder>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage_root = temp_dir.path().join("storage");

        let store = FsObjectStore::new(StoreConfig::default().with_root(storage_root));
        let transcoder = Arc::new(MockTranscoder::new());
        let segmenter = Arc::new(MockSegmenter::new(245));
        let pipeline = Arc::new(TranscodePipeline::from_shared(
            PipelineConfig::default().with_work_dir(temp_dir.path().join("work")),
            Arc::clone(&transcoder),
            segmenter,
            Arc::new(store),
        ));

        let queue = Arc::new(MemoryJobQueue::new());
        let sink = Arc::new(MockTrackSink::new());
        LifecycleObserver::spawn(&queue, sink.clone());

        let worker = TranscodeWorker::new(
            WorkerConfig::default().with_poll_interval_ms(20),
            Arc::clone(&queue),
            pipeline,
        );

        Self {
            queue,
            worker,
            sink,
            transcoder,
            _temp_dir: temp_dir,
        }
    }

    async fn seed_master(&self, audio_id: &str) {
        let bucket = self
            ._temp_dir
            .path()
            .join("storage")
            .join("incoming-audio");
        tokio::fs::create_dir_all(&bucket)
            .await
            .expect("Failed to create incoming bucket");
        tokio::fs::write(bucket.join(audio_id), b"pretend pcm")
            .await
            .expect("Failed to seed master");
    }

    /// Polls until the job record reaches a terminal state or the timeout
    /// elapses.
    async fn wait_for_finished(&self, job_id: uuid::Uuid, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if let Some(record) = self.queue.job(job_id).await {
                if record.state == JobState::Finished {
                    return true;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

#[tokio::test]
async fn test_worker_drains_queue_to_completion() {
    let harness = TestHarness::new();
    harness.seed_master("track-1").await;
    harness.seed_master("track-2").await;

    let first = harness.queue.enqueue(JobPayload::new("track-1", "wav")).await;
    let second = harness
        .queue
        .enqueue(JobPayload::new("track-2", "flac"))
        .await;

    harness.worker.start();
    assert!(harness.wait_for_finished(first, Duration::from_secs(5)).await);
    assert!(harness.wait_for_finished(second, Duration::from_secs(5)).await);
    harness.worker.stop();

    let record = harness.queue.job(first).await.unwrap();
    assert_eq!(record.progress_percent, 100);
    assert!(record.outcome.as_ref().unwrap().is_completed());
    assert!(record.finished_at.is_some());

    // Both masters went through the full plan.
    assert_eq!(harness.transcoder.recorded_requests().await.len(), 12);
}

#[tokio::test]
async fn test_terminal_outcomes_reach_the_sink() {
    let harness = TestHarness::new();
    harness.seed_master("good").await;
    // "bad" has no master seeded, so its fetch fails.

    let good = harness.queue.enqueue(JobPayload::new("good", "wav")).await;
    let bad = harness.queue.enqueue(JobPayload::new("bad", "wav")).await;

    harness.worker.start();
    assert!(harness.wait_for_finished(good, Duration::from_secs(5)).await);
    assert!(harness.wait_for_finished(bad, Duration::from_secs(5)).await);
    harness.worker.stop();

    // Give the observer task a beat to drain the broadcast channel.
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(harness.sink.processed().await, vec![("good".to_string(), 245)]);
    let errored = harness.sink.errored().await;
    assert_eq!(errored.len(), 1);
    assert_eq!(errored[0].0, "bad");
}

#[tokio::test]
async fn test_failed_job_keeps_partial_progress_off_the_record() {
    let harness = TestHarness::new();
    harness.seed_master("doomed").await;
    harness.transcoder.fail_format("opus").await;

    let id = harness.queue.enqueue(JobPayload::new("doomed", "wav")).await;
    harness.worker.start();
    assert!(harness.wait_for_finished(id, Duration::from_secs(5)).await);
    harness.worker.stop();

    let record = harness.queue.job(id).await.unwrap();
    assert!(!record.outcome.as_ref().unwrap().is_completed());
    // Progress stops where the encode plan broke, well short of done.
    assert!(record.progress_percent < 100);
}

#[tokio::test]
async fn test_stalled_job_gets_a_second_attempt() {
    let harness = TestHarness::new();
    harness.seed_master("slow").await;

    let id = harness.queue.enqueue(JobPayload::new("slow", "wav")).await;
    let job = harness.queue.dequeue().await.unwrap();
    assert_eq!(job.id, id);

    // Simulate a worker that died mid-job: no progress reports arrive, the
    // sweep re-queues, and a live worker picks the job up again.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let requeued = harness.queue.requeue_stalled(0).await;
    assert_eq!(requeued, vec![id]);

    harness.worker.start();
    assert!(harness.wait_for_finished(id, Duration::from_secs(5)).await);
    harness.worker.stop();

    let record = harness.queue.job(id).await.unwrap();
    assert_eq!(record.attempt, 2);
    assert!(record.outcome.as_ref().unwrap().is_completed());

    // The stall marked the track errored; the retry flipped it back.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let errored = harness.sink.errored().await;
    assert_eq!(errored.len(), 1);
    assert_eq!(errored[0].0, "slow");
    assert_eq!(harness.sink.processed().await, vec![("slow".to_string(), 245)]);
}
