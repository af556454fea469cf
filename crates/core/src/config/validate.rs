use super::{types::Config, ConfigError};
use crate::transcoder::validate_formats;

/// Validate configuration
/// Currently validates:
/// - The derivative format plan (non-empty, no lossless bitrates, no
///   duplicate output filenames)
/// - Bucket names are non-empty and distinct
/// - Segment length is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_formats(&config.pipeline.formats).map_err(ConfigError::ValidationError)?;

    if config.pipeline.incoming_bucket.is_empty() || config.pipeline.final_bucket.is_empty() {
        return Err(ConfigError::ValidationError(
            "bucket names cannot be empty".to_string(),
        ));
    }
    if config.pipeline.incoming_bucket == config.pipeline.final_bucket {
        return Err(ConfigError::ValidationError(
            "incoming and final buckets must differ".to_string(),
        ));
    }

    if config.segmenter.segment_secs == 0 {
        return Err(ConfigError::ValidationError(
            "segmenter.segment_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcoder::{AudioContainer, FormatSpec};

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_format_plan_fails() {
        let mut config = Config::default();
        config.pipeline.formats.clear();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_lossless_bitrate_fails() {
        let mut config = Config::default();
        config.pipeline.formats = vec![FormatSpec {
            container: AudioContainer::Flac,
            codec: Some("flac".to_string()),
            bitrate_kbps: Some(320),
        }];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_same_buckets_fail() {
        let mut config = Config::default();
        config.pipeline.incoming_bucket = "audio".to_string();
        config.pipeline.final_bucket = "audio".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_segment_length_fails() {
        let mut config = Config::default();
        config.segmenter.segment_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
