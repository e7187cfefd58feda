//! Axum route handlers for the Keyword Tracker API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::tracker::check::{check_positions, CheckOutcome};
use crate::tracker::report::{build_report, CannibalizationReport};
use crate::tracker::{KeywordSource, TrackedKeyword};

#[derive(Debug, Deserialize)]
pub struct AddKeywordRequest {
    pub keyword: String,
    pub language: String,
    pub target_url: String,
    pub target_page: String,
    #[serde(default = "default_source")]
    pub source: KeywordSource,
}

fn default_source() -> KeywordSource {
    KeywordSource::Manual
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    /// Check a single keyword when set, otherwise all of them.
    #[serde(default)]
    pub keyword_id: Option<Uuid>,
}

/// GET /api/v1/keywords
pub async fn handle_list_keywords(State(state): State<AppState>) -> Json<Vec<TrackedKeyword>> {
    Json(state.keywords.list().await)
}

/// POST /api/v1/keywords
pub async fn handle_add_keyword(
    State(state): State<AppState>,
    Json(request): Json<AddKeywordRequest>,
) -> Result<Json<TrackedKeyword>, AppError> {
    let keyword = state
        .keywords
        .add(
            &request.keyword,
            &request.language,
            &request.target_url,
            &request.target_page,
            request.source,
        )
        .await?;
    Ok(Json(keyword))
}

/// POST /api/v1/keywords/check
///
/// Runs the sequential, rate-limited batch check. A batch of N keywords
/// always returns N outcomes; per-keyword collaborator failures are carried
/// in the outcome rather than failing the request.
pub async fn handle_check_positions(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<Vec<CheckOutcome>>, AppError> {
    let outcomes = check_positions(
        &state.keywords,
        state.search.as_ref(),
        &state.config.site_domain,
        request.keyword_id,
    )
    .await?;
    Ok(Json(outcomes))
}

/// GET /api/v1/keywords/cannibalization
pub async fn handle_cannibalization(
    State(state): State<AppState>,
) -> Json<CannibalizationReport> {
    let keywords = state.keywords.list().await;
    Json(build_report(&keywords))
}
