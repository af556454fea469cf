//! Types for the queue module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::JobOutcome;

/// What a transcode job operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Identifier of the uploaded audio, also its key in the incoming bucket.
    pub audio_id: String,
    /// Extension of the uploaded master file, without the dot.
    pub file_extension: String,
}

impl JobPayload {
    /// Creates a payload.
    pub fn new(audio_id: impl Into<String>, file_extension: impl Into<String>) -> Self {
        Self {
            audio_id: audio_id.into(),
            file_extension: file_extension.into(),
        }
    }
}

/// Lifecycle state of a job on the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting to be picked up.
    Queued,
    /// Being processed by a worker.
    Active,
    /// Reached a terminal outcome.
    Finished,
}

/// Everything the queue tracks about one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Queue-assigned identifier.
    pub id: Uuid,
    /// What to transcode.
    pub payload: JobPayload,
    /// Current lifecycle state.
    pub state: JobState,
    /// Last reported completion percentage.
    pub progress_percent: u8,
    /// How many times the job has been handed to a worker.
    pub attempt: u32,
    /// When the job was first enqueued.
    pub enqueued_at: DateTime<Utc>,
    /// When the current attempt started, if any.
    pub started_at: Option<DateTime<Utc>>,
    /// Last time the worker reported progress on the current attempt.
    pub last_progress_at: Option<DateTime<Utc>>,
    /// When the job finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Terminal outcome, present once finished.
    pub outcome: Option<JobOutcome>,
}

impl JobRecord {
    pub(crate) fn new(payload: JobPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            state: JobState::Queued,
            progress_percent: 0,
            attempt: 0,
            enqueued_at: Utc::now(),
            started_at: None,
            last_progress_at: None,
            finished_at: None,
            outcome: None,
        }
    }
}

/// Lifecycle events broadcast by the queue.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// A job reached a terminal outcome.
    Finished {
        job_id: Uuid,
        audio_id: String,
        outcome: JobOutcome,
    },
    /// A stalled job was put back on the queue for another attempt.
    Stalled {
        job_id: Uuid,
        audio_id: String,
        attempt: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_queued() {
        let record = JobRecord::new(JobPayload::new("abc", "wav"));
        assert_eq!(record.state, JobState::Queued);
        assert_eq!(record.progress_percent, 0);
        assert_eq!(record.attempt, 0);
        assert!(record.outcome.is_none());
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = JobRecord::new(JobPayload::new("abc", "wav"));
        let json = serde_json::to_string(&record).unwrap();
        let parsed: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, record.id);
        assert_eq!(parsed.payload, record.payload);
        assert_eq!(parsed.state, JobState::Queued);
    }
}
