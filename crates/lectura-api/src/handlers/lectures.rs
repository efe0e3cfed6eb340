//! Lecture creation handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use lectura_models::{CreateLectureRequest, CreateLectureResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/lectures
///
/// Creates the job record and launches the pipeline as a detached task.
/// Returns immediately; completion is observable only via the status
/// endpoint.
///
/// Returns:
/// - 202: Job accepted, body carries the job id
/// - 400: Invalid script
pub async fn create_lecture(
    State(state): State<AppState>,
    Json(request): Json<CreateLectureRequest>,
) -> ApiResult<(StatusCode, Json<CreateLectureResponse>)> {
    request.validate().map_err(ApiError::bad_request)?;

    let job = state.pipeline.create_job(request.script).await?;
    info!(job_id = %job.id, "Accepted lecture job");

    state.pipeline.spawn(job.id.clone());

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateLectureResponse {
            job_id: job.id.to_string(),
        }),
    ))
}
