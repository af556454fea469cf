//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target container for a derivative output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioContainer {
    /// WAVE (uncompressed archival)
    Wav,
    /// Free Lossless Audio Codec (lossless archival)
    Flac,
    /// Ogg Opus (modern lossy distribution)
    Opus,
    /// MPEG Audio Layer III (lossy distribution)
    Mp3,
}

impl AudioContainer {
    /// Returns the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Opus => "opus",
            Self::Mp3 => "mp3",
        }
    }

    /// Returns the ffmpeg muxer name for this container.
    pub fn ffmpeg_format(&self) -> &'static str {
        // Muxer names happen to match the extensions for all four containers.
        self.extension()
    }

    /// Whether this container holds lossless audio.
    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Wav | Self::Flac)
    }
}

/// One entry of the derivative format plan.
///
/// Codec and bitrate are optional: entries without a codec use the muxer's
/// default encoder (wav falls back to pcm_s16le), and lossless entries never
/// carry a bitrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Target container.
    pub container: AudioContainer,
    /// Explicit encoder to use (`-c:a`), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Target bitrate in kbps (`-b:a`), lossy variants only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
}

impl FormatSpec {
    /// Spec with encoder defaults.
    pub fn container_only(container: AudioContainer) -> Self {
        Self {
            container,
            codec: None,
            bitrate_kbps: None,
        }
    }

    /// Spec with an explicit codec and no bitrate.
    pub fn with_codec(container: AudioContainer, codec: &str) -> Self {
        Self {
            container,
            codec: Some(codec.to_string()),
            bitrate_kbps: None,
        }
    }

    /// Spec with an explicit codec and bitrate.
    pub fn with_bitrate(container: AudioContainer, codec: &str, bitrate_kbps: u32) -> Self {
        Self {
            container,
            codec: Some(codec.to_string()),
            bitrate_kbps: Some(bitrate_kbps),
        }
    }

    /// Deterministic output filename: `generated.<ext>` for single-variant
    /// formats, `generated.<bitrate>.<ext>` for bitrate variants.
    pub fn output_filename(&self) -> String {
        match self.bitrate_kbps {
            Some(bitrate) => format!("generated.{}.{}", bitrate, self.container.extension()),
            None => format!("generated.{}", self.container.extension()),
        }
    }

    /// Short human-readable label, e.g. `mp3@320` or `flac`.
    pub fn label(&self) -> String {
        match self.bitrate_kbps {
            Some(bitrate) => format!("{}@{}", self.container.extension(), bitrate),
            None => self.container.extension().to_string(),
        }
    }
}

/// The default derivative plan: one archival wav, one flac, one opus, and
/// three mp3 bitrate variants. List order fixes progress increments only.
pub fn default_formats() -> Vec<FormatSpec> {
    vec![
        FormatSpec::container_only(AudioContainer::Wav),
        FormatSpec::with_codec(AudioContainer::Flac, "flac"),
        FormatSpec::with_codec(AudioContainer::Opus, "libopus"),
        FormatSpec::with_bitrate(AudioContainer::Mp3, "libmp3lame", 128),
        FormatSpec::with_bitrate(AudioContainer::Mp3, "libmp3lame", 256),
        FormatSpec::with_bitrate(AudioContainer::Mp3, "libmp3lame", 320),
    ]
}

/// Validates a format plan against the invariants of the derivative set:
/// a non-empty list, no bitrate on lossless entries, at most one entry per
/// lossless container, and no duplicate output filenames.
pub fn validate_formats(formats: &[FormatSpec]) -> Result<(), String> {
    if formats.is_empty() {
        return Err("format plan is empty".to_string());
    }

    let mut seen_filenames = std::collections::HashSet::new();
    let mut seen_lossless = std::collections::HashSet::new();

    for spec in formats {
        if spec.container.is_lossless() {
            if spec.bitrate_kbps.is_some() {
                return Err(format!(
                    "lossless entry {} must not carry a bitrate",
                    spec.label()
                ));
            }
            if !seen_lossless.insert(spec.container) {
                return Err(format!(
                    "duplicate lossless entry for {}",
                    spec.container.extension()
                ));
            }
        }
        if !seen_filenames.insert(spec.output_filename()) {
            return Err(format!("duplicate output filename {}", spec.output_filename()));
        }
    }

    Ok(())
}

/// A single-format transcode request against a local master file.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    /// Local path of the fetched master.
    pub input_path: PathBuf,
    /// Deterministic output path inside the working folder.
    pub output_path: PathBuf,
    /// Target format.
    pub spec: FormatSpec,
}

/// Result of a successful single-format transcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeOutput {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub size_bytes: u64,
    /// Wall-clock encode duration in milliseconds.
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_extension() {
        assert_eq!(AudioContainer::Wav.extension(), "wav");
        assert_eq!(AudioContainer::Flac.extension(), "flac");
        assert_eq!(AudioContainer::Opus.extension(), "opus");
        assert_eq!(AudioContainer::Mp3.extension(), "mp3");
    }

    #[test]
    fn test_container_lossless() {
        assert!(AudioContainer::Wav.is_lossless());
        assert!(AudioContainer::Flac.is_lossless());
        assert!(!AudioContainer::Opus.is_lossless());
        assert!(!AudioContainer::Mp3.is_lossless());
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            FormatSpec::container_only(AudioContainer::Wav).output_filename(),
            "generated.wav"
        );
        assert_eq!(
            FormatSpec::with_bitrate(AudioContainer::Mp3, "libmp3lame", 128).output_filename(),
            "generated.128.mp3"
        );
    }

    #[test]
    fn test_default_formats_shape() {
        let formats = default_formats();
        assert_eq!(formats.len(), 6);
        // Every lossless entry uses encoder defaults for bitrate.
        for spec in formats.iter().filter(|s| s.container.is_lossless()) {
            assert!(spec.bitrate_kbps.is_none());
        }
        // Three mp3 bitrate variants.
        let mp3s: Vec<_> = formats
            .iter()
            .filter(|s| s.container == AudioContainer::Mp3)
            .collect();
        assert_eq!(mp3s.len(), 3);
        assert_eq!(
            mp3s.iter().map(|s| s.bitrate_kbps.unwrap()).collect::<Vec<_>>(),
            vec![128, 256, 320]
        );
    }

    #[test]
    fn test_default_formats_valid() {
        assert!(validate_formats(&default_formats()).is_ok());
    }

    #[test]
    fn test_validate_rejects_lossless_bitrate() {
        let formats = vec![FormatSpec {
            container: AudioContainer::Flac,
            codec: Some("flac".to_string()),
            bitrate_kbps: Some(320),
        }];
        assert!(validate_formats(&formats).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_lossless() {
        let formats = vec![
            FormatSpec::container_only(AudioContainer::Wav),
            FormatSpec::container_only(AudioContainer::Wav),
        ];
        assert!(validate_formats(&formats).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_plan() {
        assert!(validate_formats(&[]).is_err());
    }
}
