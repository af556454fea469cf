//! Types for the segmenter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Playlist filename produced in the working folder.
pub const PLAYLIST_FILENAME: &str = "playlist.m3u8";

/// Segment filename pattern (zero-based, zero-padded three-digit index).
pub const SEGMENT_PATTERN: &str = "segment-%03d.ts";

/// Result of a successful segmentation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationResult {
    /// Measured duration of the master in whole seconds, derived from the
    /// last progress marker the encoder emitted. Zero when no marker was
    /// ever parseable.
    pub duration_secs: u64,
    /// Path of the produced playlist.
    pub playlist_path: PathBuf,
    /// Number of segment files produced.
    pub segment_count: usize,
}

/// Parses an encoder time marker (`HH:MM:SS` with an optional fractional
/// part) into whole seconds: each component is rounded independently, then
/// summed as `hours*3600 + minutes*60 + seconds`.
pub fn parse_timemark(timemark: &str) -> Option<u64> {
    let mut parts = timemark.split(':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours.round() as u64 * 3600 + minutes.round() as u64 * 60 + seconds.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timemark_minutes() {
        assert_eq!(parse_timemark("00:01:05"), Some(65));
    }

    #[test]
    fn test_parse_timemark_hours() {
        assert_eq!(parse_timemark("01:02:03"), Some(3723));
    }

    #[test]
    fn test_parse_timemark_zero() {
        assert_eq!(parse_timemark("00:00:00"), Some(0));
    }

    #[test]
    fn test_parse_timemark_fractional_rounds_component() {
        // The seconds component rounds on its own before summing.
        assert_eq!(parse_timemark("00:00:59.62"), Some(60));
        assert_eq!(parse_timemark("00:03:12.40"), Some(192));
    }

    #[test]
    fn test_parse_timemark_rejects_garbage() {
        assert_eq!(parse_timemark("N/A"), None);
        assert_eq!(parse_timemark("12:34"), None);
        assert_eq!(parse_timemark("1:2:3:4"), None);
        assert_eq!(parse_timemark(""), None);
    }
}
