pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::drafts::handlers as drafts;
use crate::state::AppState;
use crate::tracker::handlers as tracker;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API — pure, reentrant
        .route("/api/v1/analysis/seo", post(analysis::handle_seo))
        .route(
            "/api/v1/analysis/readability",
            post(analysis::handle_readability),
        )
        .route(
            "/api/v1/articles/:language/:slug/seo",
            get(analysis::handle_article_seo),
        )
        .route(
            "/api/v1/articles/:language/:slug/readability",
            get(analysis::handle_article_readability),
        )
        // Keyword Tracker API
        .route(
            "/api/v1/keywords",
            get(tracker::handle_list_keywords).post(tracker::handle_add_keyword),
        )
        .route("/api/v1/keywords/check", post(tracker::handle_check_positions))
        .route(
            "/api/v1/keywords/cannibalization",
            get(tracker::handle_cannibalization),
        )
        // Drafts API
        .route("/api/v1/drafts/generate", post(drafts::handle_generate))
        .route("/api/v1/drafts/jobs", get(drafts::handle_list_jobs))
        .route("/api/v1/drafts/jobs/:id", get(drafts::handle_get_job))
        .with_state(state)
}
