//! Queue-driven transcode worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::pipeline::{JobOutcome, JobProgress, TranscodePipeline};
use crate::segmenter::Segmenter;
use crate::store::ObjectStore;
use crate::transcoder::Transcoder;

use super::config::WorkerConfig;
use super::memory::MemoryJobQueue;
use super::types::JobRecord;

/// Polls the queue and runs each job through the pipeline.
///
/// Jobs run one at a time; the queue serializes access to ffmpeg rather than
/// fanning encodes out. Progress flows back to the queue over a channel so a
/// stall sweep can distinguish slow encodes from dead ones.
pub struct TranscodeWorker<T: Transcoder + 'static, S: Segmenter + 'static, O: ObjectStore + 'static>
{
    config: WorkerConfig,
    queue: Arc<MemoryJobQueue>,
    pipeline: Arc<TranscodePipeline<T, S, O>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl<T: Transcoder, S: Segmenter, O: ObjectStore> TranscodeWorker<T, S, O> {
    /// Creates a worker over a queue and pipeline.
    pub fn new(
        config: WorkerConfig,
        queue: Arc<MemoryJobQueue>,
        pipeline: Arc<TranscodePipeline<T, S, O>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            queue,
            pipeline,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Starts the poll and stall-sweep loops.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Worker already running");
            return;
        }
        info!("Starting transcode worker");
        self.spawn_job_loop();
        self.spawn_stall_loop();
    }

    /// Stops the worker after the current job finishes.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping transcode worker");
        let _ = self.shutdown_tx.send(());
    }

    /// True while the loops are live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn spawn_job_loop(&self) {
        let running = Arc::clone(&self.running);
        let queue = Arc::clone(&self.queue);
        let pipeline = Arc::clone(&self.pipeline);
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Worker job loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Worker job loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        while let Some(job) = queue.dequeue().await {
                            Self::process_job(&queue, &pipeline, &config, job).await;
                            if !running.load(Ordering::Relaxed) {
                                break;
                            }
                        }
                    }
                }
            }
            info!("Worker job loop stopped");
        });
    }

    fn spawn_stall_loop(&self) {
        let running = Arc::clone(&self.running);
        let queue = Arc::clone(&self.queue);
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(Duration::from_millis(config.stall_check_interval_ms)) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let requeued = queue.requeue_stalled(config.stall_timeout_secs).await;
                        if !requeued.is_empty() {
                            warn!(count = requeued.len(), "re-queued stalled jobs");
                        }
                    }
                }
            }
        });
    }

    async fn process_job(
        queue: &Arc<MemoryJobQueue>,
        pipeline: &Arc<TranscodePipeline<T, S, O>>,
        config: &WorkerConfig,
        job: JobRecord,
    ) {
        let job_id = job.id;
        let audio_id = job.payload.audio_id.clone();
        debug!(%job_id, %audio_id, attempt = job.attempt, "picked up job");

        if job.attempt > config.max_attempts {
            let outcome = JobOutcome::Failed {
                error: format!("Gave up after {} attempts", job.attempt - 1),
            };
            if let Err(e) = queue.finish(job_id, outcome).await {
                warn!(%job_id, error = %e, "failed to finish exhausted job");
            }
            return;
        }

        // Bridge pipeline progress into the queue record. The channel is
        // drained by a task so a busy queue lock never backpressures ffmpeg.
        let (progress_tx, mut progress_rx) = mpsc::channel::<JobProgress>(32);
        let bridge_queue = Arc::clone(queue);
        let bridge = tokio::spawn(async move {
            while let Some(update) = progress_rx.recv().await {
                if let Err(e) = bridge_queue.update_progress(job_id, update.percent).await {
                    debug!(%job_id, error = %e, "dropped progress update");
                }
            }
        });

        let outcome = pipeline
            .execute(&audio_id, &job.payload.file_extension, Some(progress_tx))
            .await;
        bridge.await.ok();

        if let Err(e) = queue.finish(job_id, outcome).await {
            warn!(%job_id, error = %e, "failed to record job outcome");
        }
    }
}
