//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during a single-format transcode.
#[derive(Debug, Error)]
pub enum TranscoderError {
    /// FFmpeg binary not found.
    #[error("ffmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Encoder process exited with a failure status.
    #[error("encoding failed: {reason}")]
    EncodingFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Encoder exceeded the configured timeout and was killed.
    #[error("encoding timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Encoder reported success but the output file is missing or empty.
    #[error("output file missing or empty: {path}")]
    EmptyOutput { path: PathBuf },

    /// I/O error while driving the encoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscoderError {
    /// Creates an encoding failed error with captured stderr.
    pub fn encoding_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodingFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Whether this error is worth retrying at the queue level.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
