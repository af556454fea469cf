//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcoder::{TranscodeOutput, TranscodeRequest, Transcoder, TranscoderError};

/// Mock implementation of the Transcoder trait.
///
/// Writes a small placeholder file at the requested output path so pipeline
/// code that uploads the working folder has something real to upload.
/// Failures can be scripted per format label.
#[derive(Debug)]
pub struct MockTranscoder {
    requests: Arc<RwLock<Vec<TranscodeRequest>>>,
    failing_labels: Arc<RwLock<HashSet<String>>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            failing_labels: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Make every request for the given format label fail.
    pub async fn fail_format(&self, label: impl Into<String>) {
        self.failing_labels.write().await.insert(label.into());
    }

    /// Requests seen so far, in submission order.
    pub async fn recorded_requests(&self) -> Vec<TranscodeRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(
        &self,
        request: TranscodeRequest,
    ) -> Result<TranscodeOutput, TranscoderError> {
        self.requests.write().await.push(request.clone());

        if self
            .failing_labels
            .read()
            .await
            .contains(&request.spec.label())
        {
            return Err(TranscoderError::encoding_failed(
                format!("scripted failure for {}", request.spec.label()),
                None,
            ));
        }

        let body = format!("derivative {}", request.spec.label());
        tokio::fs::write(&request.output_path, body.as_bytes()).await?;

        Ok(TranscodeOutput {
            output_path: request.output_path,
            size_bytes: body.len() as u64,
            elapsed_ms: 1,
        })
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        Ok(())
    }
}
