pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod segmenter;
pub mod store;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use pipeline::{JobOutcome, JobProgress, PipelineConfig, PipelineError, TranscodePipeline};
pub use queue::{
    JobPayload, JobRecord, JobState, LifecycleObserver, MemoryJobQueue, QueueEvent,
    TrackStatusSink, TranscodeWorker, WorkerConfig,
};
pub use segmenter::{FfmpegSegmenter, SegmentationResult, Segmenter, SegmenterConfig, SegmenterError};
pub use store::{FsObjectStore, ObjectStore, PutResult, StoreConfig, StoreError};
pub use transcoder::{
    default_formats, AudioContainer, FfmpegTranscoder, FormatSpec, TranscodeOutput,
    TranscodeRequest, Transcoder, TranscoderConfig, TranscoderError,
};
