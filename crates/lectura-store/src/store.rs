//! Filesystem-backed job store.
//!
//! One JSON document per job id under a root directory, written atomically
//! via temp-file + rename. A per-id mutex serializes read-modify-write
//! cycles, so concurrent updates to the same job cannot lose writes.
//!
//! `get` always re-reads from disk: progress may be reported by a process
//! other than the one driving the pipeline, so an in-memory cache would
//! serve stale state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lectura_models::{Job, JobId, JobStatus, JobUpdate};

use crate::error::{StoreError, StoreResult};

/// Durable job store keyed by job id.
#[derive(Clone)]
pub struct JobStore {
    root: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl JobStore {
    /// Open (or create) a store rooted at the given directory.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Open a store rooted at `LECTURA_JOBS_DIR` (default `/tmp/lectura/jobs`).
    pub async fn from_env() -> StoreResult<Self> {
        let root = std::env::var("LECTURA_JOBS_DIR")
            .unwrap_or_else(|_| "/tmp/lectura/jobs".to_string());
        Self::open(root).await
    }

    /// Create a new pending job. Fails if the id already exists; callers
    /// must generate fresh identifiers.
    pub async fn create(&self, id: JobId, script: impl Into<String>) -> StoreResult<Job> {
        validate_id(id.as_str())?;
        let lock = self.lock_for(id.as_str()).await;
        let _guard = lock.lock().await;

        let path = self.job_path(id.as_str());
        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }

        let job = Job::new(id, script);
        self.write_job(&job).await?;
        debug!(job_id = %job.id, "Created job");
        Ok(job)
    }

    /// Read a job, always from the durable backing store.
    pub async fn get(&self, id: &JobId) -> StoreResult<Job> {
        validate_id(id.as_str())?;
        self.read_job(id.as_str()).await
    }

    /// Merge a partial update into a job.
    ///
    /// Atomic per job id: the read-modify-write cycle holds the id's mutex.
    /// Terminal jobs reject all updates; `updated_at` is refreshed on every
    /// successful merge.
    pub async fn update(&self, id: &JobId, update: JobUpdate) -> StoreResult<Job> {
        validate_id(id.as_str())?;
        let lock = self.lock_for(id.as_str()).await;
        let _guard = lock.lock().await;

        let mut job = self.read_job(id.as_str()).await?;

        if job.is_terminal() {
            return Err(StoreError::TerminalJob(id.to_string()));
        }

        apply_update(&mut job, update)?;
        job.updated_at = Utc::now();

        self.write_job(&job).await?;
        debug!(job_id = %job.id, status = %job.status, progress = job.progress, "Updated job");
        Ok(job)
    }

    fn job_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    async fn read_job(&self, id: &str) -> StoreResult<Job> {
        let path = self.job_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_job(&self, job: &Job) -> StoreResult<()> {
        let path = self.job_path(job.id.as_str());
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(job)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Job ids become file names; restrict them accordingly.
fn validate_id(id: &str) -> StoreResult<()> {
    if id.is_empty() || id.len() > 64 {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn apply_update(job: &mut Job, update: JobUpdate) -> StoreResult<()> {
    if let Some(progress) = update.progress {
        if progress > 100 {
            return Err(StoreError::invalid_update(format!(
                "progress {} out of range [0,100]",
                progress
            )));
        }
        if progress < job.progress {
            // Monotonicity is best-effort; a regression signals a bug upstream.
            warn!(
                job_id = %job.id,
                from = job.progress,
                to = progress,
                "Progress regression in update"
            );
        }
        job.progress = progress;
    }

    if let Some(status) = update.status {
        match status {
            JobStatus::Completed => {
                let has_url = update.artifact_url.is_some() || job.artifact_url.is_some();
                if !has_url {
                    return Err(StoreError::invalid_update(
                        "completed status requires an artifact URL",
                    ));
                }
                job.progress = 100;
            }
            JobStatus::Failed => {
                let has_error = update.error.is_some() || job.error.is_some();
                if !has_error {
                    return Err(StoreError::invalid_update(
                        "failed status requires an error message",
                    ));
                }
            }
            _ => {}
        }
        job.status = status;
    }

    if let Some(url) = update.artifact_url {
        job.artifact_url = Some(url);
    }
    if let Some(error) = update.error {
        job.error = Some(error);
    }

    Ok(())
}
