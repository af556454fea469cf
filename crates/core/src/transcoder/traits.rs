//! Trait definitions for the transcoder module.

use async_trait::async_trait;

use super::error::TranscoderError;
use super::types::{TranscodeOutput, TranscodeRequest};

/// A transcoder that renders one derivative format from a local master file.
///
/// Implementations resolve when the encoder completes and reject with the
/// encoder's error text on failure. The pipeline sequences requests; an
/// implementation never runs two conversions for the same job concurrently.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Renders `request.spec` from the master at `request.input_path` into
    /// `request.output_path`.
    async fn transcode(&self, request: TranscodeRequest) -> Result<TranscodeOutput, TranscoderError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscoderError>;
}
