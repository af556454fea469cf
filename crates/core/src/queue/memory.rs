//! In-memory job queue.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use chrono::{Duration, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::metrics;
use crate::pipeline::JobOutcome;

use super::types::{JobPayload, JobRecord, JobState, QueueEvent};

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    /// The operation does not apply in the job's current state.
    #[error("Job {id} is {state:?}, expected {expected:?}")]
    InvalidState {
        id: Uuid,
        state: JobState,
        expected: JobState,
    },
}

struct Inner {
    pending: VecDeque<Uuid>,
    jobs: HashMap<Uuid, JobRecord>,
}

/// FIFO in-memory job queue with stall recovery.
///
/// Finished records are retained so callers can inspect outcomes; a
/// persistent queue behind the same surface would evict them instead.
pub struct MemoryJobQueue {
    inner: Arc<RwLock<Inner>>,
    events: broadcast::Sender<QueueEvent>,
}

impl MemoryJobQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                pending: VecDeque::new(),
                jobs: HashMap::new(),
            })),
            events,
        }
    }

    /// Subscribes to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Adds a job to the back of the queue and returns its id.
    pub async fn enqueue(&self, payload: JobPayload) -> Uuid {
        let record = JobRecord::new(payload);
        let id = record.id;
        let mut inner = self.inner.write().await;
        debug!(job_id = %id, audio_id = %record.payload.audio_id, "job enqueued");
        inner.jobs.insert(id, record);
        inner.pending.push_back(id);
        id
    }

    /// Takes the oldest queued job, marking it active. Returns `None` when
    /// the queue is empty.
    pub async fn dequeue(&self) -> Option<JobRecord> {
        let mut inner = self.inner.write().await;
        while let Some(id) = inner.pending.pop_front() {
            // A pending id whose record is no longer queued was finished
            // out of band after a stall re-queue; skip it.
            let Some(record) = inner.jobs.get_mut(&id) else {
                continue;
            };
            if record.state != JobState::Queued {
                continue;
            }
            let now = Utc::now();
            record.state = JobState::Active;
            record.attempt += 1;
            record.started_at = Some(now);
            record.last_progress_at = Some(now);
            return Some(record.clone());
        }
        None
    }

    /// Records a progress update for an active job.
    pub async fn update_progress(&self, id: Uuid, percent: u8) -> Result<(), QueueError> {
        let mut inner = self.inner.write().await;
        let record = inner.jobs.get_mut(&id).ok_or(QueueError::JobNotFound(id))?;
        if record.state != JobState::Active {
            return Err(QueueError::InvalidState {
                id,
                state: record.state,
                expected: JobState::Active,
            });
        }
        if percent > record.progress_percent {
            record.progress_percent = percent;
        }
        record.last_progress_at = Some(Utc::now());
        Ok(())
    }

    /// Finishes a job with its terminal outcome and broadcasts the event.
    pub async fn finish(&self, id: Uuid, outcome: JobOutcome) -> Result<(), QueueError> {
        let event = {
            let mut inner = self.inner.write().await;
            let record = inner.jobs.get_mut(&id).ok_or(QueueError::JobNotFound(id))?;
            record.state = JobState::Finished;
            record.finished_at = Some(Utc::now());
            if outcome.is_completed() {
                record.progress_percent = 100;
            }
            record.outcome = Some(outcome.clone());
            info!(
                job_id = %id,
                audio_id = %record.payload.audio_id,
                completed = outcome.is_completed(),
                "job finished"
            );
            QueueEvent::Finished {
                job_id: id,
                audio_id: record.payload.audio_id.clone(),
                outcome,
            }
        };
        let _ = self.events.send(event);
        Ok(())
    }

    /// Puts an active job back on the queue for another attempt.
    pub async fn mark_stalled(&self, id: Uuid) -> Result<(), QueueError> {
        let event = {
            let mut inner = self.inner.write().await;
            let record = inner.jobs.get_mut(&id).ok_or(QueueError::JobNotFound(id))?;
            if record.state != JobState::Active {
                return Err(QueueError::InvalidState {
                    id,
                    state: record.state,
                    expected: JobState::Active,
                });
            }
            record.state = JobState::Queued;
            record.progress_percent = 0;
            record.started_at = None;
            record.last_progress_at = None;
            let event = QueueEvent::Stalled {
                job_id: id,
                audio_id: record.payload.audio_id.clone(),
                attempt: record.attempt,
            };
            warn!(job_id = %id, audio_id = %record.payload.audio_id, "job stalled, re-queued");
            inner.pending.push_back(id);
            event
        };
        metrics::JOB_STALLS.inc();
        let _ = self.events.send(event);
        Ok(())
    }

    /// Re-queues active jobs whose last progress report is older than the
    /// given age. Returns the ids that were re-queued.
    pub async fn requeue_stalled(&self, max_age_secs: u64) -> Vec<Uuid> {
        let cutoff = Utc::now() - Duration::seconds(max_age_secs as i64);
        let stalled: Vec<Uuid> = {
            let inner = self.inner.read().await;
            inner
                .jobs
                .values()
                .filter(|r| {
                    r.state == JobState::Active
                        && r.last_progress_at.map(|t| t < cutoff).unwrap_or(false)
                })
                .map(|r| r.id)
                .collect()
        };
        let mut requeued = Vec::new();
        for id in stalled {
            if self.mark_stalled(id).await.is_ok() {
                requeued.push(id);
            }
        }
        requeued
    }

    /// Looks up a job by id.
    pub async fn job(&self, id: Uuid) -> Option<JobRecord> {
        self.inner.read().await.jobs.get(&id).cloned()
    }

    /// Number of queued jobs.
    pub async fn pending_count(&self) -> usize {
        self.inner.read().await.pending.len()
    }
}

impl Default for MemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}
