//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::analysis::readability::{analyze_readability, ReadabilityReport};
use crate::analysis::seo::{analyze_seo, ArticleMeta, SeoReport};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeoAnalyzeRequest {
    #[serde(default)]
    pub meta: ArticleMeta,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadabilityRequest {
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// POST /api/v1/analysis/seo
///
/// Scores a draft (metadata + body) against the SEO checklist.
pub async fn handle_seo(
    State(state): State<AppState>,
    Json(request): Json<SeoAnalyzeRequest>,
) -> Json<SeoReport> {
    Json(analyze_seo(
        &request.meta,
        &request.body,
        &state.config.site_domain,
    ))
}

/// POST /api/v1/analysis/readability
pub async fn handle_readability(
    Json(request): Json<ReadabilityRequest>,
) -> Json<ReadabilityReport> {
    Json(analyze_readability(&request.body, &request.language))
}

/// GET /api/v1/articles/:language/:slug/seo
///
/// Scores an article already in the content store.
pub async fn handle_article_seo(
    State(state): State<AppState>,
    Path((language, slug)): Path<(String, String)>,
) -> Result<Json<SeoReport>, AppError> {
    let article = state.articles.read(&language, &slug).await?;
    let meta = ArticleMeta {
        title: article.title,
        description: article.description,
        tags: article.tags,
        date: article.date,
        keyword: article.keyword,
        siblings: article.siblings,
    };
    Ok(Json(analyze_seo(
        &meta,
        &article.body,
        &state.config.site_domain,
    )))
}

/// GET /api/v1/articles/:language/:slug/readability
pub async fn handle_article_readability(
    State(state): State<AppState>,
    Path((language, slug)): Path<(String, String)>,
) -> Result<Json<ReadabilityReport>, AppError> {
    let article = state.articles.read(&language, &slug).await?;
    Ok(Json(analyze_readability(&article.body, &language)))
}
