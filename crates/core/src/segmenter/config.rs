//! Configuration for the segmenter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ffmpeg-based HLS segmenter.
///
/// Defaults follow the streaming profile served to clients: 320k stereo
/// AAC at 48 kHz in 10-second segments with an unbounded playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Audio encoder for the segmented stream.
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Target bitrate in kbps.
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    /// Channel count.
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,

    /// Segment duration in seconds.
    #[serde(default = "default_segment_secs")]
    pub segment_secs: u32,

    /// Timeout for the whole segmentation run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level.
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_codec() -> String {
    // Fraunhofer FDK AAC; requires an ffmpeg build with libfdk_aac enabled.
    "libfdk_aac".to_string()
}

fn default_bitrate() -> u32 {
    320
}

fn default_channels() -> u8 {
    2
}

fn default_sample_rate() -> u32 {
    48_000
}

fn default_segment_secs() -> u32 {
    10
}

fn default_timeout() -> u64 {
    1800
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            codec: default_codec(),
            bitrate_kbps: default_bitrate(),
            channels: default_channels(),
            sample_rate_hz: default_sample_rate(),
            segment_secs: default_segment_secs(),
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
        }
    }
}

impl SegmenterConfig {
    /// Sets the ffmpeg binary path.
    pub fn with_ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = path;
        self
    }

    /// Sets the audio encoder.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }
}
