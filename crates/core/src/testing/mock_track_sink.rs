//! Mock track status sink for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::queue::TrackStatusSink;

/// Mock implementation of the TrackStatusSink trait.
///
/// Records every call for assertions.
#[derive(Debug, Default)]
pub struct MockTrackSink {
    processed: Arc<RwLock<Vec<(String, u64)>>>,
    errored: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockTrackSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// `(audio_id, duration_secs)` pairs marked processed, in call order.
    pub async fn processed(&self) -> Vec<(String, u64)> {
        self.processed.read().await.clone()
    }

    /// `(audio_id, error)` pairs marked errored, in call order.
    pub async fn errored(&self) -> Vec<(String, String)> {
        self.errored.read().await.clone()
    }
}

#[async_trait]
impl TrackStatusSink for MockTrackSink {
    async fn mark_processed(&self, audio_id: &str, duration_secs: u64) {
        self.processed
            .write()
            .await
            .push((audio_id.to_string(), duration_secs));
    }

    async fn mark_errored(&self, audio_id: &str, error: &str) {
        self.errored
            .write()
            .await
            .push((audio_id.to_string(), error.to_string()));
    }
}
