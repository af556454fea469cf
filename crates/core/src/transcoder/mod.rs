//! Transcoder module for rendering derivative audio formats.
//!
//! This module provides the `Transcoder` trait and an ffmpeg-backed
//! implementation that converts one local master file into one target
//! format per invocation. The pipeline sequences invocations, one per
//! entry of the format plan.
//!
//! # Example
//!
//! ```ignore
//! use chorale_core::transcoder::{
//!     default_formats, FfmpegTranscoder, Transcoder, TranscodeRequest,
//! };
//!
//! let transcoder = FfmpegTranscoder::with_defaults();
//! transcoder.validate().await?;
//!
//! for spec in default_formats() {
//!     let request = TranscodeRequest {
//!         input_path: work_dir.join("original.wav"),
//!         output_path: work_dir.join(spec.output_filename()),
//!         spec,
//!     };
//!     transcoder.transcode(request).await?;
//! }
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscoderError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{
    default_formats, validate_formats, AudioContainer, FormatSpec, TranscodeOutput,
    TranscodeRequest,
};
