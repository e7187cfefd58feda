//! Axum route handlers for the Drafts API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::drafts::progress::DraftProgress;
use crate::drafts::runner::{generate_draft, GenerateDraftRequest, GenerateDraftResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/drafts/generate
///
/// Runs the full chunked pipeline. This is a long call — possibly minutes
/// for a large outline; progress is observable via the jobs endpoints, and
/// the draft is persisted before this returns, so a dropped connection does
/// not lose the result.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateDraftRequest>,
) -> Result<Json<GenerateDraftResponse>, AppError> {
    let response = generate_draft(
        state.llm.as_ref(),
        &state.jobs,
        &state.articles,
        &state.keywords,
        request,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/drafts/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<DraftProgress>> {
    Json(state.jobs.list().await)
}

/// GET /api/v1/drafts/jobs/:id
///
/// Finished jobs disappear a short grace period after completion, after
/// which this returns 404.
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<DraftProgress>, AppError> {
    state
        .jobs
        .get(job_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("job {job_id}")))
}
