//! Propagates queue outcomes to the track catalog.

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::pipeline::JobOutcome;

use super::memory::MemoryJobQueue;
use super::types::QueueEvent;

/// Receives terminal job outcomes on behalf of the track catalog.
#[async_trait]
pub trait TrackStatusSink: Send + Sync {
    /// The audio finished transcoding and its derivatives are published.
    async fn mark_processed(&self, audio_id: &str, duration_secs: u64);

    /// The audio could not be transcoded.
    async fn mark_errored(&self, audio_id: &str, error: &str);
}

/// Subscribes to queue events and forwards terminal outcomes to a sink.
pub struct LifecycleObserver;

impl LifecycleObserver {
    /// Spawns the observer task. It runs until the queue's event sender is
    /// dropped.
    pub fn spawn(queue: &MemoryJobQueue, sink: Arc<dyn TrackStatusSink>) -> JoinHandle<()> {
        let mut events = queue.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(QueueEvent::Finished {
                        audio_id, outcome, ..
                    }) => match outcome {
                        JobOutcome::Completed { duration_secs } => {
                            sink.mark_processed(&audio_id, duration_secs).await;
                        }
                        JobOutcome::Failed { error } => {
                            sink.mark_errored(&audio_id, &error).await;
                        }
                    },
                    Ok(QueueEvent::Stalled {
                        audio_id, attempt, ..
                    }) => {
                        // The job is back on the queue, but clients polling
                        // the track must not wait on a worker that may never
                        // report again. A successful retry flips the state
                        // back via mark_processed.
                        info!(%audio_id, attempt, "job stalled, marking errored pending retry");
                        sink.mark_errored(&audio_id, "transcoding stalled").await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "observer lagged behind queue events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
