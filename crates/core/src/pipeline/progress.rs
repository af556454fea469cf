//! Progress accounting for pipeline runs.

use tokio::sync::mpsc;
use tracing::trace;

use super::types::JobProgress;

/// Accumulates fractional progress and reports whole, monotonically
/// non-decreasing percentages.
///
/// Per-format increments are fractional (the encode phase splits 70 points
/// across the plan), so the reporter keeps an `f32` internally and only the
/// rounded value crosses the channel. Sends never block: a slow or absent
/// consumer drops updates rather than stalling the encode.
pub struct ProgressReporter {
    audio_id: String,
    tx: Option<mpsc::Sender<JobProgress>>,
    current: f32,
    last_reported: u8,
}

impl ProgressReporter {
    /// Creates a reporter for one job. `tx` is optional so fire-and-forget
    /// runs skip the channel entirely.
    pub fn new(audio_id: impl Into<String>, tx: Option<mpsc::Sender<JobProgress>>) -> Self {
        Self {
            audio_id: audio_id.into(),
            tx,
            current: 0.0,
            last_reported: 0,
        }
    }

    /// Jumps to an absolute percentage. Values below the current position
    /// are ignored to keep the sequence monotone.
    pub fn set(&mut self, percent: f32) {
        if percent > self.current {
            self.current = percent;
        }
        self.report();
    }

    /// Advances by a fractional increment.
    pub fn advance(&mut self, delta: f32) {
        self.current += delta;
        self.report();
    }

    /// The last whole percentage reported.
    pub fn percent(&self) -> u8 {
        self.last_reported
    }

    fn report(&mut self) {
        let rounded = self.current.round().clamp(0.0, 100.0) as u8;
        if rounded <= self.last_reported {
            return;
        }
        self.last_reported = rounded;
        trace!(audio_id = %self.audio_id, percent = rounded, "progress");
        if let Some(ref tx) = self.tx {
            let _ = tx.try_send(JobProgress {
                audio_id: self.audio_id.clone(),
                percent: rounded,
            });
        }
    }
}
