//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transcoder::{default_formats, FormatSpec};

/// Configuration for the transcode pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for per-job working folders.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Bucket the uploaded masters arrive in.
    #[serde(default = "default_incoming_bucket")]
    pub incoming_bucket: String,

    /// Bucket the published derivatives live in.
    #[serde(default = "default_final_bucket")]
    pub final_bucket: String,

    /// Derivative format plan applied to every master.
    #[serde(default = "default_formats")]
    pub formats: Vec<FormatSpec>,

    /// Prefix under which derivatives are staged before publication.
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("chorale-work")
}

fn default_incoming_bucket() -> String {
    "incoming-audio".to_string()
}

fn default_final_bucket() -> String {
    "final-audio".to_string()
}

fn default_staging_prefix() -> String {
    "staging".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            incoming_bucket: default_incoming_bucket(),
            final_bucket: default_final_bucket(),
            formats: default_formats(),
            staging_prefix: default_staging_prefix(),
        }
    }
}

impl PipelineConfig {
    /// Sets the working folder root.
    pub fn with_work_dir(mut self, dir: PathBuf) -> Self {
        self.work_dir = dir;
        self
    }

    /// Sets the incoming bucket name.
    pub fn with_incoming_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.incoming_bucket = bucket.into();
        self
    }

    /// Sets the final bucket name.
    pub fn with_final_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.final_bucket = bucket.into();
        self
    }

    /// Replaces the derivative format plan.
    pub fn with_formats(mut self, formats: Vec<FormatSpec>) -> Self {
        self.formats = formats;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.incoming_bucket, "incoming-audio");
        assert_eq!(config.final_bucket, "final-audio");
        assert_eq!(config.formats.len(), 6);
        assert_eq!(config.staging_prefix, "staging");
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default()
            .with_incoming_bucket("in")
            .with_final_bucket("out");
        assert_eq!(config.incoming_bucket, "in");
        assert_eq!(config.final_bucket, "out");
    }
}
