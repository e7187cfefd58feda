use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub serp_api_key: String,
    /// Own domain of the blog, e.g. "example.com". Used to recognize
    /// internal links and own-domain search results.
    pub site_domain: String,
    /// Directory holding article records, one file per (language, slug).
    pub content_dir: PathBuf,
    /// Directory holding the persisted keyword store.
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            serp_api_key: require_env("SERP_API_KEY")?,
            site_domain: require_env("SITE_DOMAIN")?,
            content_dir: require_env("CONTENT_DIR")?.into(),
            data_dir: require_env("DATA_DIR")?.into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
