//! Job status handler for progress polling.

use axum::extract::{Path, State};
use axum::Json;
use tracing::debug;

use lectura_models::{JobId, JobStatusResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/jobs/:job_id/status
///
/// Returns the latest known state of a job, read from the durable store on
/// every request.
///
/// Returns:
/// - 200: Job status
/// - 400: Malformed job id
/// - 404: Unknown job id
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    if !is_valid_job_id(&job_id) {
        return Err(ApiError::bad_request("Invalid job ID format"));
    }

    debug!(job_id = %job_id, "Status poll");

    let job = state.store.get(&JobId::from_string(job_id)).await?;
    Ok(Json(JobStatusResponse::from(&job)))
}

/// Validate job ID format before it reaches the store.
///
/// Valid format: alphanumeric characters and hyphens only, 8-64 chars.
fn is_valid_job_id(id: &str) -> bool {
    if id.len() < 8 || id.len() > 64 {
        return false;
    }
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_job_ids() {
        assert!(is_valid_job_id("12345678"));
        assert!(is_valid_job_id("abc-1234-def"));
        assert!(is_valid_job_id("550e8400-e29b-41d4-a716-446655440000"));
    }

    #[test]
    fn test_invalid_job_ids() {
        assert!(!is_valid_job_id(""));
        assert!(!is_valid_job_id("short"));
        assert!(!is_valid_job_id("has space"));
        assert!(!is_valid_job_id("has_underscore"));
        assert!(!is_valid_job_id("../../../etc/passwd"));
        assert!(!is_valid_job_id(&"a".repeat(65)));
    }
}
