//! Job orchestration.
//!
//! Drives one job through synthesize -> fetch media -> render chain ->
//! publish, updating the job store at coarse checkpoints. Which stage
//! failures are fatal, degrading, or absorbed is decided here, not in the
//! stages themselves.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use lectura_models::{Job, JobId, JobUpdate, MediaItem};
use lectura_render::{ArtifactKind, RenderChain, RenderContext};
use lectura_speech::SpeechSynthesizer;
use lectura_storage::ArtifactPublisher;
use lectura_store::JobStore;
use lectura_visuals::StockMediaClient;

use crate::error::{PipelineError, PipelineResult};
use crate::scenes::scene_keywords;

/// Progress checkpoints. Coarse on purpose: the poller needs "is it moving",
/// not an accurate percentage.
const PROGRESS_ACCEPTED: u8 = 5;
const PROGRESS_SYNTHESIZED: u8 = 30;
const PROGRESS_MEDIA_FETCHED: u8 = 40;
const PROGRESS_RENDERED: u8 = 85;

/// Content types by artifact kind.
const VIDEO_CONTENT_TYPE: &str = "video/mp4";
const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Concurrent pipeline runs across all jobs.
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

/// Wall-clock cap for one job run.
const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(1800);

/// Orchestrates lecture-generation jobs.
pub struct Pipeline {
    store: JobStore,
    speech: SpeechSynthesizer,
    visuals: Option<StockMediaClient>,
    chain: RenderChain,
    publisher: Arc<dyn ArtifactPublisher>,
    work_root: PathBuf,
    voice_id: String,
    job_semaphore: Arc<Semaphore>,
    job_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        store: JobStore,
        speech: SpeechSynthesizer,
        visuals: Option<StockMediaClient>,
        chain: RenderChain,
        publisher: Arc<dyn ArtifactPublisher>,
        work_root: PathBuf,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            speech,
            visuals,
            chain,
            publisher,
            work_root,
            voice_id: voice_id.into(),
            job_semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_JOBS)),
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }

    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.job_semaphore = Arc::new(Semaphore::new(max));
        self
    }

    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Create the job record. The caller decides when to launch the run.
    pub async fn create_job(&self, script: impl Into<String>) -> PipelineResult<Job> {
        let job = self.store.create(JobId::new(), script).await?;
        Ok(job)
    }

    /// Launch a detached pipeline run for the job.
    ///
    /// Fire-and-forget by design: completion is observable only through the
    /// job store. Runs queue on a bounded semaphore so a burst of requests
    /// cannot start unbounded concurrent renders. There is no cancellation
    /// once a run starts.
    pub fn spawn(self: &Arc<Self>, job_id: JobId) {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = match pipeline.job_semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!(job_id = %job_id, "Job semaphore closed; job never started");
                    return;
                }
            };
            pipeline.run(job_id).await;
        });
    }

    /// Run one job to its terminal state.
    pub async fn run(&self, job_id: JobId) {
        let job = match self.store.get(&job_id).await {
            Ok(job) => job,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Cannot load job; aborting run");
                return;
            }
        };

        // Mark accepted immediately so pollers can tell "picked up" from
        // "still queued".
        if let Err(e) = self
            .store
            .update(&job_id, JobUpdate::processing(PROGRESS_ACCEPTED))
            .await
        {
            error!(job_id = %job_id, error = %e, "Cannot mark job processing; aborting run");
            return;
        }

        let work_dir = self.work_root.join(job_id.as_str());
        let result = match tokio::time::timeout(self.job_timeout, self.run_stages(&job, &work_dir)).await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::DeadlineExceeded(self.job_timeout.as_secs())),
        };

        // Temp resources are owned by this execution alone; clean them up
        // regardless of outcome.
        if work_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
                warn!(job_id = %job_id, error = %e, "Failed to clean up work dir");
            }
        }

        match result {
            Ok(artifact_url) => {
                info!(job_id = %job_id, artifact_url = %artifact_url, "Job completed");
                if let Err(e) = self
                    .store
                    .update(&job_id, JobUpdate::completed(artifact_url))
                    .await
                {
                    error!(job_id = %job_id, error = %e, "Failed to persist completion");
                }
            }
            Err(e) => {
                let message = e.user_message();
                error!(job_id = %job_id, error = %e, "Job failed");
                if let Err(e) = self.store.update(&job_id, JobUpdate::failed(message)).await {
                    error!(job_id = %job_id, error = %e, "Failed to persist failure");
                }
            }
        }
    }

    async fn run_stages(&self, job: &Job, work_dir: &Path) -> PipelineResult<String> {
        tokio::fs::create_dir_all(work_dir).await?;

        // Speech synthesis: fatal on failure, there is no lecture without
        // narration.
        let audio_path = self
            .speech
            .synthesize_script(&job.script, &self.voice_id, work_dir)
            .await?;
        self.checkpoint(&job.id, PROGRESS_SYNTHESIZED).await;

        // Pre-publish the narration so the remote grid has a network
        // address for it. Best-effort: losing it only disables the remote
        // strategy, the local ones read from disk.
        let audio_url = match self
            .publisher
            .publish(&audio_path, job.id.as_str(), AUDIO_CONTENT_TYPE)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Audio pre-publish failed; remote render disabled");
                None
            }
        };

        // Media fetch: degrading. Visuals are an enhancement, not a
        // requirement.
        let media = self.fetch_media(&job.script).await;
        self.checkpoint(&job.id, PROGRESS_MEDIA_FETCHED).await;

        // Render chain: individual strategy failures are absorbed inside
        // the chain; only full exhaustion surfaces here.
        let ctx = RenderContext {
            script: job.script.clone(),
            media,
            audio_path,
            audio_url,
            work_dir: work_dir.to_path_buf(),
        };
        let (artifact, attempts) = self.chain.run(&ctx).await?;
        info!(
            job_id = %job.id,
            attempts = attempts.len(),
            winner = %attempts
                .last()
                .map(|a| a.strategy.as_str())
                .unwrap_or("unknown"),
            "Render chain finished"
        );
        self.checkpoint(&job.id, PROGRESS_RENDERED).await;

        // Publish: fatal on failure, an unpublishable artifact is no result.
        let content_type = match artifact.kind {
            ArtifactKind::Video => VIDEO_CONTENT_TYPE,
            ArtifactKind::Audio => AUDIO_CONTENT_TYPE,
        };
        let url = self
            .publisher
            .publish(&artifact.path, job.id.as_str(), content_type)
            .await?;

        Ok(url)
    }

    async fn fetch_media(&self, script: &str) -> Vec<MediaItem> {
        let Some(visuals) = &self.visuals else {
            return Vec::new();
        };

        let keywords = scene_keywords(script);
        if keywords.is_empty() {
            return Vec::new();
        }

        visuals.fetch_for_scenes(&keywords).await
    }

    /// Persist a progress checkpoint. Progress is advisory; failing to
    /// record it must not kill the job.
    async fn checkpoint(&self, job_id: &JobId, progress: u8) {
        if let Err(e) = self.store.update(job_id, JobUpdate::progress(progress)).await {
            warn!(job_id = %job_id, progress, error = %e, "Failed to persist progress checkpoint");
        }
    }
}
