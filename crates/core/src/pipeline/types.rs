//! Types for the pipeline module.

use serde::{Deserialize, Serialize};

/// A progress update emitted while a job runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    /// Identifier of the audio the job is transcoding.
    pub audio_id: String,
    /// Overall completion percentage, monotonically non-decreasing.
    pub percent: u8,
}

/// Terminal outcome of one pipeline run.
///
/// Failures are data, not panics: every run resolves to one of these so the
/// queue can persist the outcome on the job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The master was transcoded, segmented and published.
    Completed {
        /// Measured duration of the master in whole seconds.
        duration_secs: u64,
    },
    /// The run failed; nothing was published.
    Failed {
        /// Human-readable failure description.
        error: String,
    },
}

impl JobOutcome {
    /// True for the completed variant.
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}
