//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::TranscoderConfig;
use super::error::TranscoderError;
use super::traits::Transcoder;
use super::types::{AudioContainer, FormatSpec, TranscodeOutput, TranscodeRequest};

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new ffmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds ffmpeg arguments for one derivative format.
    fn build_args(&self, input_path: &Path, output_path: &Path, spec: &FormatSpec) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            // Audio-only output, always
            "-vn".to_string(),
        ];

        if let Some(ref codec) = spec.codec {
            args.extend(["-c:a".to_string(), codec.clone()]);
        }

        if let Some(bitrate) = spec.bitrate_kbps {
            args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
        }

        // The mp3 Xing header embeds encode-time stream statistics; suppress
        // it so repeated encodes of the same master are byte-stable.
        if spec.container == AudioContainer::Mp3 {
            args.extend(["-write_xing".to_string(), "0".to_string()]);
        }

        args.extend([
            "-f".to_string(),
            spec.container.ffmpeg_format().to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(output_path.to_string_lossy().to_string());

        args
    }

    async fn run_encode(&self, request: &TranscodeRequest) -> Result<TranscodeOutput, TranscoderError> {
        let start = Instant::now();

        if !request.input_path.exists() {
            return Err(TranscoderError::InputNotFound {
                path: request.input_path.clone(),
            });
        }

        let args = self.build_args(&request.input_path, &request.output_path, &request.spec);
        debug!(format = %request.spec.label(), ?args, "spawning ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    TranscoderError::Io(e)
                }
            })?;

        let stderr = child.stderr.take().expect("stderr should be captured");
        let mut reader = BufReader::new(stderr).lines();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut error_output = String::new();
            while let Ok(Some(line)) = reader.next_line().await {
                error_output.push_str(&line);
                error_output.push('\n');
            }
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(TranscoderError::encoding_failed(
                        format!(
                            "ffmpeg exited with code {:?} converting to {}",
                            status.code(),
                            request.spec.label()
                        ),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
            }
            Ok(Err(e)) => return Err(TranscoderError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(TranscoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        // The encoder can exit cleanly with a zero-length file on some
        // malformed inputs; the derivative set must only contain real audio.
        let meta = tokio::fs::metadata(&request.output_path)
            .await
            .map_err(|_| TranscoderError::EmptyOutput {
                path: request.output_path.clone(),
            })?;
        if meta.len() == 0 {
            return Err(TranscoderError::EmptyOutput {
                path: request.output_path.clone(),
            });
        }

        Ok(TranscodeOutput {
            output_path: request.output_path.clone(),
            size_bytes: meta.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<TranscodeOutput, TranscoderError> {
        self.run_encode(&request).await
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(TranscoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(TranscoderError::Io(e));
        }

        Ok(())
    }
}
