use std::sync::Arc;

use crate::articles::ArticleStore;
use crate::config::Config;
use crate::drafts::progress::JobRegistry;
use crate::llm_client::TextGenerator;
use crate::serp_client::SearchProvider;
use crate::tracker::store::KeywordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text-generation collaborator. Concrete client in production,
    /// scripted stub in tests.
    pub llm: Arc<dyn TextGenerator>,
    /// Search-results collaborator, same substitution pattern.
    pub search: Arc<dyn SearchProvider>,
    pub keywords: Arc<KeywordStore>,
    pub articles: ArticleStore,
    pub jobs: JobRegistry,
    pub config: Config,
}
