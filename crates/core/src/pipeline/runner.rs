//! Pipeline runner implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::segmenter::{Segmenter, SegmenterError};
use crate::store::{ObjectStore, StoreError};
use crate::transcoder::{TranscodeRequest, Transcoder, TranscoderError};

use super::config::PipelineConfig;
use super::progress::ProgressReporter;
use super::types::{JobOutcome, JobProgress};

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The incoming master could not be fetched.
    #[error("Failed to fetch master for {audio_id}: {source}")]
    SourceFetch {
        audio_id: String,
        #[source]
        source: StoreError,
    },

    /// A derivative encode failed.
    #[error("Transcode to {format} failed: {source}")]
    Transcode {
        format: String,
        #[source]
        source: TranscoderError,
    },

    /// HLS segmentation failed.
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] SegmenterError),

    /// A derivative could not be uploaded.
    #[error("Upload of {key} failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Staged derivatives could not be promoted to the canonical prefix.
    #[error("Publication failed: {0}")]
    Publish(#[source] StoreError),

    /// The working folder could not be prepared.
    #[error("Workspace error at {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The transcode pipeline.
///
/// Turns one uploaded master into the full derivative set: the configured
/// encode plan plus an HLS rendition, published atomically under the
/// audio id in the final bucket.
pub struct TranscodePipeline<T: Transcoder, S: Segmenter, O: ObjectStore> {
    config: PipelineConfig,
    transcoder: Arc<T>,
    segmenter: Arc<S>,
    store: Arc<O>,
}

impl<T: Transcoder, S: Segmenter, O: ObjectStore> TranscodePipeline<T, S, O> {
    /// Creates a new pipeline from its three collaborators.
    pub fn new(config: PipelineConfig, transcoder: T, segmenter: S, store: O) -> Self {
        Self {
            config,
            transcoder: Arc::new(transcoder),
            segmenter: Arc::new(segmenter),
            store: Arc::new(store),
        }
    }

    /// Shares already-wrapped collaborators, for callers that hold them.
    pub fn from_shared(
        config: PipelineConfig,
        transcoder: Arc<T>,
        segmenter: Arc<S>,
        store: Arc<O>,
    ) -> Self {
        Self {
            config,
            transcoder,
            segmenter,
            store,
        }
    }

    /// Runs the full pipeline for one master and resolves to a terminal
    /// outcome. Errors are folded into [`JobOutcome::Failed`] so the caller
    /// always gets something to persist on the job record.
    ///
    /// The working folder is removed whichever way the run ends. On failure
    /// the staging prefix is cleared too, so a retry starts clean and the
    /// canonical prefix is never left half-written.
    pub async fn execute(
        &self,
        audio_id: &str,
        file_extension: &str,
        progress_tx: Option<mpsc::Sender<JobProgress>>,
    ) -> JobOutcome {
        let start = Instant::now();
        let work_dir = self.config.work_dir.join(audio_id);
        let result = self
            .run(audio_id, file_extension, &work_dir, progress_tx)
            .await;

        // The working folder goes away on every exit path.
        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(audio_id, error = %e, "failed to remove working folder");
            }
        }

        match result {
            Ok(duration_secs) => {
                metrics::JOBS_TOTAL.with_label_values(&["completed"]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["completed"])
                    .observe(start.elapsed().as_secs_f64());
                info!(
                    audio_id,
                    duration_secs,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "transcode job completed"
                );
                JobOutcome::Completed { duration_secs }
            }
            Err(e) => {
                let staging = self.staging_prefix(audio_id);
                if let Err(cleanup_err) = self
                    .store
                    .remove_prefix(&self.config.final_bucket, &staging)
                    .await
                {
                    warn!(audio_id, error = %cleanup_err, "failed to clear staging prefix");
                }
                metrics::JOBS_TOTAL.with_label_values(&["failed"]).inc();
                metrics::JOB_DURATION
                    .with_label_values(&["failed"])
                    .observe(start.elapsed().as_secs_f64());
                error!(audio_id, error = %e, "transcode job failed");
                JobOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn run(
        &self,
        audio_id: &str,
        file_extension: &str,
        work_dir: &PathBuf,
        progress_tx: Option<mpsc::Sender<JobProgress>>,
    ) -> Result<u64, PipelineError> {
        let mut progress = ProgressReporter::new(audio_id, progress_tx);

        self.store
            .ensure_bucket(&self.config.final_bucket)
            .await
            .map_err(PipelineError::Publish)?;

        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|e| PipelineError::Workspace {
                path: work_dir.clone(),
                source: e,
            })?;

        // Fetch the master into the working folder as original.<ext>.
        let master_path = work_dir.join(format!("original.{}", file_extension));
        self.store
            .get_to_file(&self.config.incoming_bucket, audio_id, &master_path)
            .await
            .map_err(|e| PipelineError::SourceFetch {
                audio_id: audio_id.to_string(),
                source: e,
            })?;
        progress.set(10.0);

        // Encode phase: the plan splits 70 points evenly across its entries.
        let formats = &self.config.formats;
        let per_format = 70.0 / formats.len() as f32;
        for spec in formats {
            let label = spec.label();
            let encode_start = Instant::now();
            let request = TranscodeRequest {
                input_path: master_path.clone(),
                output_path: work_dir.join(spec.output_filename()),
                spec: spec.clone(),
            };
            match self.transcoder.transcode(request).await {
                Ok(output) => {
                    metrics::CONVERSIONS_TOTAL
                        .with_label_values(&[&label, "success"])
                        .inc();
                    metrics::CONVERSION_DURATION.observe(encode_start.elapsed().as_secs_f64());
                    info!(
                        audio_id,
                        format = %label,
                        size_bytes = output.size_bytes,
                        elapsed_ms = output.elapsed_ms,
                        "derivative encoded"
                    );
                }
                Err(e) => {
                    metrics::CONVERSIONS_TOTAL
                        .with_label_values(&[&label, "failed"])
                        .inc();
                    return Err(PipelineError::Transcode { format: label, source: e });
                }
            }
            progress.advance(per_format);
        }

        // Segmentation phase produces the playlist and segments next to the
        // derivatives and measures the master's duration as a side effect.
        let segmentation = match self.segmenter.segment(&master_path, work_dir).await {
            Ok(result) => {
                metrics::SEGMENTATIONS_TOTAL
                    .with_label_values(&["success"])
                    .inc();
                result
            }
            Err(e) => {
                metrics::SEGMENTATIONS_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                return Err(e.into());
            }
        };
        info!(
            audio_id,
            duration_secs = segmentation.duration_secs,
            segment_count = segmentation.segment_count,
            "master segmented"
        );
        progress.set(90.0);

        // Upload everything except the master to the staging prefix, then
        // promote in one rename so readers never observe a partial set.
        let staging = self.staging_prefix(audio_id);
        let uploaded = self.upload_derivatives(audio_id, work_dir, &staging).await?;
        self.store
            .commit_prefix(&self.config.final_bucket, &staging, audio_id)
            .await
            .map_err(PipelineError::Publish)?;
        info!(audio_id, files = uploaded, "derivatives published");

        // The master has served its purpose; failures here are logged but do
        // not fail the already-published job.
        if let Err(e) = self
            .store
            .remove(&self.config.incoming_bucket, audio_id)
            .await
        {
            warn!(audio_id, error = %e, "failed to remove incoming master");
        }

        progress.set(100.0);
        Ok(segmentation.duration_secs)
    }

    async fn upload_derivatives(
        &self,
        audio_id: &str,
        work_dir: &PathBuf,
        staging: &str,
    ) -> Result<usize, PipelineError> {
        let mut entries =
            tokio::fs::read_dir(work_dir)
                .await
                .map_err(|e| PipelineError::Workspace {
                    path: work_dir.clone(),
                    source: e,
                })?;

        let mut uploaded = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::Workspace {
                path: work_dir.clone(),
                source: e,
            })?
        {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with("original.") {
                continue;
            }
            let key = format!("{}/{}", staging, file_name);
            let put = self
                .store
                .put_from_file(&self.config.final_bucket, &key, &entry.path())
                .await
                .map_err(|e| PipelineError::Upload {
                    key: key.clone(),
                    source: e,
                })?;
            debug!(audio_id, key = %put.key, size_bytes = put.size_bytes, "derivative staged");
            metrics::UPLOADED_BYTES.inc_by(put.size_bytes);
            metrics::FILES_UPLOADED.inc();
            uploaded += 1;
        }

        Ok(uploaded)
    }

    fn staging_prefix(&self, audio_id: &str) -> String {
        format!("{}/{}", self.config.staging_prefix, audio_id)
    }
}
