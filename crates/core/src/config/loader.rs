use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("CHORALE_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from environment variables only, on top of defaults.
/// Used when no config file is present.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Env::prefixed("CHORALE_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[storage]
buffer_size = 1024

[pipeline]
incoming_bucket = "uploads"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.storage.buffer_size, 1024);
        assert_eq!(config.pipeline.incoming_bucket, "uploads");
        assert_eq!(config.pipeline.final_bucket, "final-audio");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.pipeline.incoming_bucket, "incoming-audio");
        assert_eq!(config.worker.max_attempts, 3);
        assert_eq!(config.pipeline.formats.len(), 6);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[transcoder]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 60

[worker]
poll_interval_ms = 100
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(
            config.transcoder.ffmpeg_path.display().to_string(),
            "/opt/ffmpeg/bin/ffmpeg"
        );
        assert_eq!(config.transcoder.timeout_secs, 60);
        assert_eq!(config.worker.poll_interval_ms, 100);
    }

    #[test]
    fn test_load_config_from_str_bad_format_plan() {
        let toml = r#"
[[pipeline.formats]]
container = "kazoo"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
