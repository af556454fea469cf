//! FFmpeg-based HLS segmenter implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::SegmenterConfig;
use super::error::SegmenterError;
use super::traits::Segmenter;
use super::types::{parse_timemark, SegmentationResult, PLAYLIST_FILENAME, SEGMENT_PATTERN};

/// FFmpeg-based HLS segmenter implementation.
pub struct FfmpegSegmenter {
    config: SegmenterConfig,
}

impl FfmpegSegmenter {
    /// Creates a new ffmpeg segmenter with the given configuration.
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Creates a segmenter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SegmenterConfig::default())
    }

    /// Builds the ffmpeg arguments for the segmentation run.
    fn build_args(&self, source: &Path, out_dir: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            // Zero-based contiguous segment numbering
            "-start_number".to_string(),
            "0".to_string(),
            "-hls_time".to_string(),
            self.config.segment_secs.to_string(),
            // 0 keeps every entry in the playlist (no rolling window)
            "-hls_list_size".to_string(),
            "0".to_string(),
            "-hls_segment_filename".to_string(),
            out_dir.join(SEGMENT_PATTERN).to_string_lossy().to_string(),
            "-f".to_string(),
            "hls".to_string(),
            "-ac".to_string(),
            self.config.channels.to_string(),
            "-ar".to_string(),
            self.config.sample_rate_hz.to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.bitrate_kbps),
            "-c:a".to_string(),
            self.config.codec.clone(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            // Machine-readable progress on stderr; out_time markers feed
            // the duration measurement.
            "-progress".to_string(),
            "pipe:2".to_string(),
            out_dir.join(PLAYLIST_FILENAME).to_string_lossy().to_string(),
        ]
    }

    /// Counts the `segment-*.ts` files present in `out_dir`.
    async fn count_segments(out_dir: &Path) -> Result<usize, SegmenterError> {
        let mut count = 0;
        let mut entries = tokio::fs::read_dir(out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("segment-") && name.ends_with(".ts") {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl Segmenter for FfmpegSegmenter {
    fn name(&self) -> &str {
        "ffmpeg-hls"
    }

    async fn segment(
        &self,
        source: &Path,
        out_dir: &Path,
    ) -> Result<SegmentationResult, SegmenterError> {
        if !source.exists() {
            return Err(SegmenterError::InputNotFound {
                path: source.to_path_buf(),
            });
        }

        let args = self.build_args(source, out_dir);
        debug!(?args, "spawning ffmpeg for hls segmentation");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SegmenterError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    SegmenterError::Io(e)
                }
            })?;

        let stderr = child.stderr.take().expect("stderr should be captured");
        let mut reader = BufReader::new(stderr).lines();

        // -progress emits `out_time=HH:MM:SS.micros` lines; the last one
        // parsed before completion is the authoritative duration.
        let time_regex =
            Regex::new(r"out_time=(\d+:\d+:\d+(?:\.\d+)?)").expect("valid progress regex");

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut duration_secs = 0u64;
            let mut error_output = String::new();

            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(caps) = time_regex.captures(&line) {
                    if let Some(parsed) = caps.get(1).and_then(|m| parse_timemark(m.as_str())) {
                        duration_secs = parsed;
                    }
                } else if !line.starts_with("progress=") && !line.contains('=') {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }
            }

            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, duration_secs, error_output))
        })
        .await;

        let (status, duration_secs, error_output) = match result {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) => return Err(SegmenterError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(SegmenterError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !status.success() {
            return Err(SegmenterError::segmentation_failed(
                format!("ffmpeg exited with code {:?}", status.code()),
                if error_output.is_empty() {
                    None
                } else {
                    Some(error_output)
                },
            ));
        }

        let playlist_path = out_dir.join(PLAYLIST_FILENAME);
        if !playlist_path.exists() {
            return Err(SegmenterError::PlaylistMissing {
                path: playlist_path,
            });
        }

        if duration_secs == 0 {
            // Not fatal: the derivative set is still complete, but the
            // track record will carry a zero duration.
            warn!(source = %source.display(), "no parseable progress marker; duration defaults to 0");
        }

        Ok(SegmentationResult {
            duration_secs,
            playlist_path,
            segment_count: Self::count_segments(out_dir).await?,
        })
    }

    async fn validate(&self) -> Result<(), SegmenterError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(SegmenterError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(SegmenterError::Io(e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_hls_profile() {
        let segmenter = FfmpegSegmenter::with_defaults();
        let args = segmenter.build_args(Path::new("/work/original.wav"), Path::new("/work"));

        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"-hls_time".to_string()));
        assert!(args.contains(&"10".to_string()));
        assert!(args.contains(&"-hls_list_size".to_string()));
        assert!(args.contains(&"-start_number".to_string()));
        assert!(args.contains(&"-ac".to_string()));
        assert!(args.contains(&"2".to_string()));
        assert!(args.contains(&"-ar".to_string()));
        assert!(args.contains(&"48000".to_string()));
        assert!(args.contains(&"320k".to_string()));
        assert!(args.contains(&"libfdk_aac".to_string()));
        assert!(args.iter().any(|a| a.ends_with("segment-%03d.ts")));
        assert!(args.last().unwrap().ends_with("playlist.m3u8"));
    }

    #[tokio::test]
    async fn test_count_segments() {
        let temp = tempfile::TempDir::new().unwrap();
        for i in 0..4 {
            tokio::fs::write(temp.path().join(format!("segment-{:03}.ts", i)), b"x")
                .await
                .unwrap();
        }
        tokio::fs::write(temp.path().join("playlist.m3u8"), b"#EXTM3U")
            .await
            .unwrap();

        let count = FfmpegSegmenter::count_segments(temp.path()).await.unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_missing_input_rejected() {
        let segmenter = FfmpegSegmenter::with_defaults();
        let result = segmenter
            .segment(Path::new("/nonexistent/original.wav"), Path::new("/tmp"))
            .await;
        assert!(matches!(result, Err(SegmenterError::InputNotFound { .. })));
    }
}
