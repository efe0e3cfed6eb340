//! HTTP request/response schemas.

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobStatus};

/// Maximum accepted script length in bytes.
pub const MAX_SCRIPT_BYTES: usize = 512 * 1024;

/// Request body for creating a lecture job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLectureRequest {
    /// Narration script to synthesize and render
    pub script: String,
}

impl CreateLectureRequest {
    /// Validate the request, returning a human-readable rejection reason.
    pub fn validate(&self) -> Result<(), String> {
        if self.script.trim().is_empty() {
            return Err("script must not be empty".to_string());
        }
        if self.script.len() > MAX_SCRIPT_BYTES {
            return Err(format!(
                "script exceeds maximum length of {} bytes",
                MAX_SCRIPT_BYTES
            ));
        }
        Ok(())
    }
}

/// Response for a created lecture job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLectureResponse {
    pub job_id: String,
}

/// Response for a job status poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            status: job.status,
            progress: job.progress,
            artifact_url: job.artifact_url.clone(),
            error: job.error.clone(),
        }
    }
}
