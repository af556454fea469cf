//! Job queue and worker.
//!
//! Uploads enqueue one job per master; the worker drains the queue through
//! the pipeline one job at a time, with stall detection re-queueing jobs
//! whose progress reports dry up. Terminal outcomes are broadcast so the
//! track catalog can be updated out of band.

mod config;
mod memory;
mod observer;
mod types;
mod worker;

pub use config::WorkerConfig;
pub use memory::{MemoryJobQueue, QueueError};
pub use observer::{LifecycleObserver, TrackStatusSink};
pub use types::{JobPayload, JobRecord, JobState, QueueEvent};
pub use worker::TranscodeWorker;
