//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the pipeline's collaborator
//! traits, allowing full pipeline and queue tests without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use chorale_core::testing::{MockSegmenter, MockTranscoder, MockTrackSink};
//!
//! let transcoder = MockTranscoder::new();
//! let segmenter = MockSegmenter::new(245);
//!
//! // Script a failure for one derivative
//! transcoder.fail_format("mp3@320").await;
//!
//! // Use in a TranscodePipeline...
//! ```

mod mock_segmenter;
mod mock_track_sink;
mod mock_transcoder;

pub use mock_segmenter::MockSegmenter;
pub use mock_track_sink::MockTrackSink;
pub use mock_transcoder::MockTranscoder;
