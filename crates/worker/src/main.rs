use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chorale_core::{
    load_config, load_config_from_env, metrics, validate_config, FfmpegSegmenter,
    FfmpegTranscoder, FsObjectStore, JobPayload, LifecycleObserver, MemoryJobQueue, Segmenter,
    TrackStatusSink, TranscodePipeline, TranscodeWorker, Transcoder,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A track status sink that only logs. Stands in for the catalog-update
/// webhook the platform registers in production.
struct LogTrackSink;

#[async_trait::async_trait]
impl TrackStatusSink for LogTrackSink {
    async fn mark_processed(&self, audio_id: &str, duration_secs: u64) {
        info!(audio_id, duration_secs, "track marked processed");
    }

    async fn mark_errored(&self, audio_id: &str, error: &str) {
        error!(audio_id, error, "track marked errored");
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("chorale {} starting", VERSION);

    // Load configuration. An explicit path must exist; the default path is
    // optional and falls back to env-only configuration.
    let config = match std::env::var("CHORALE_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        Err(_) => {
            let default_path = PathBuf::from("config.toml");
            if default_path.exists() {
                info!("Loading configuration from {:?}", default_path);
                load_config(&default_path).context("Failed to load config.toml")?
            } else {
                info!("No config file, using defaults with environment overrides");
                load_config_from_env().context("Failed to load config from environment")?
            }
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!(
        incoming_bucket = %config.pipeline.incoming_bucket,
        final_bucket = %config.pipeline.final_bucket,
        formats = config.pipeline.formats.len(),
        "configuration loaded"
    );

    // Register metrics so a scraper or the shutdown dump sees them.
    let registry = prometheus::Registry::new();
    for metric in metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metrics")?;
    }

    // Build the pipeline collaborators.
    let transcoder = FfmpegTranscoder::new(config.transcoder.clone());
    transcoder
        .validate()
        .await
        .context("ffmpeg is not usable for transcoding")?;
    let segmenter = FfmpegSegmenter::new(config.segmenter.clone());
    segmenter
        .validate()
        .await
        .context("ffmpeg is not usable for segmentation")?;
    let store = FsObjectStore::new(config.storage.clone());

    let pipeline = Arc::new(TranscodePipeline::new(
        config.pipeline.clone(),
        transcoder,
        segmenter,
        store,
    ));

    let queue = Arc::new(MemoryJobQueue::new());
    let observer = LifecycleObserver::spawn(&queue, Arc::new(LogTrackSink));

    let worker = TranscodeWorker::new(config.worker.clone(), Arc::clone(&queue), pipeline);
    worker.start();
    info!("Transcode worker started");

    // Seed jobs from the command line: each argument is audio_id:extension.
    seed_jobs(&queue).await;

    // Run until interrupted.
    signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
    info!("Shutdown signal received");

    worker.stop();
    observer.abort();

    dump_metrics(&registry);
    info!("chorale stopped");
    Ok(())
}

async fn seed_jobs(queue: &Arc<MemoryJobQueue>) {
    for arg in std::env::args().skip(1) {
        match arg.split_once(':') {
            Some((audio_id, extension)) if !audio_id.is_empty() && !extension.is_empty() => {
                let id = queue
                    .enqueue(JobPayload::new(audio_id, extension))
                    .await;
                info!(audio_id, extension, job_id = %id, "job enqueued from command line");
            }
            _ => {
                warn!(argument = %arg, "ignoring argument, expected audio_id:extension");
            }
        }
    }
}

fn dump_metrics(registry: &prometheus::Registry) {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();
    if encoder.encode(&registry.gather(), &mut buffer).is_ok() {
        if let Ok(text) = String::from_utf8(buffer) {
            for line in text.lines().filter(|l| !l.starts_with('#')) {
                info!(metric = line, "final metric");
            }
        }
    }
}
