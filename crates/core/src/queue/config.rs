//! Configuration for the queue module.

use serde::{Deserialize, Serialize};

/// Configuration for the transcode worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Queue poll interval in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Seconds without a progress report before an active job counts as
    /// stalled and is re-queued.
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: u64,

    /// Stall sweep interval in milliseconds.
    #[serde(default = "default_stall_check_interval")]
    pub stall_check_interval_ms: u64,

    /// Attempts before a job is failed instead of re-queued.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval() -> u64 {
    500
}

fn default_stall_timeout() -> u64 {
    600 // 10 minutes
}

fn default_stall_check_interval() -> u64 {
    30_000 // 30 seconds
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            stall_timeout_secs: default_stall_timeout(),
            stall_check_interval_ms: default_stall_check_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl WorkerConfig {
    /// Sets the poll interval.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Sets the stall timeout.
    pub fn with_stall_timeout_secs(mut self, secs: u64) -> Self {
        self.stall_timeout_secs = secs;
        self
    }

    /// Sets the attempt cap.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.stall_timeout_secs, 600);
        assert_eq!(config.max_attempts, 3);
    }
}
