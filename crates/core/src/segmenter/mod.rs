//! Segmenter module for the adaptive-streaming derivative.
//!
//! Produces an HLS playlist (`playlist.m3u8`) and zero-based, contiguous
//! `segment-NNN.ts` files from a local master, and measures the master's
//! true duration from the encoder's progress output along the way.

mod config;
mod error;
mod hls;
mod traits;
mod types;

pub use config::SegmenterConfig;
pub use error::SegmenterError;
pub use hls::FfmpegSegmenter;
pub use traits::Segmenter;
pub use types::{parse_timemark, SegmentationResult, PLAYLIST_FILENAME, SEGMENT_PATTERN};
