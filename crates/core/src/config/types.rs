use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineConfig;
use crate::queue::WorkerConfig;
use crate::segmenter::SegmenterConfig;
use crate::store::StoreConfig;
use crate::transcoder::TranscoderConfig;

/// Root configuration
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// working local setup: filesystem storage under the default root and the
/// standard derivative plan.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StoreConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}
