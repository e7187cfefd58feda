mod analysis;
mod articles;
mod config;
mod drafts;
mod errors;
mod llm_client;
mod routes;
mod serp_client;
mod state;
mod tracker;
mod urls;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::articles::ArticleStore;
use crate::config::Config;
use crate::drafts::progress::JobRegistry;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::serp_client::SerpClient;
use crate::state::AppState;
use crate::tracker::store::KeywordStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pressmark API v{}", env!("CARGO_PKG_VERSION"));
    info!("Site domain: {}", config.site_domain);

    // Persisted keyword store
    let keywords = Arc::new(KeywordStore::open(config.data_dir.join("keywords.json")).await?);
    info!("Keyword store loaded ({} tracked)", keywords.list().await.len());

    // Article store (content directory)
    let articles = ArticleStore::new(config.content_dir.clone());

    // Collaborator clients
    let llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let search = Arc::new(SerpClient::new(config.serp_api_key.clone()));
    info!("Search client initialized");

    // Build app state
    let state = AppState {
        llm,
        search,
        keywords,
        articles,
        jobs: JobRegistry::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
