//! The transcode pipeline.
//!
//! One run takes an uploaded master from the incoming bucket through the
//! derivative encode plan, HLS segmentation, staged upload and atomic
//! publication to the final bucket. Collaborators are injected through the
//! [`Transcoder`](crate::transcoder::Transcoder),
//! [`Segmenter`](crate::segmenter::Segmenter) and
//! [`ObjectStore`](crate::store::ObjectStore) traits.

mod config;
mod progress;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use progress::ProgressReporter;
pub use runner::{PipelineError, TranscodePipeline};
pub use types::{JobOutcome, JobProgress};
