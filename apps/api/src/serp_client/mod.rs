//! Search-results collaborator client.
//!
//! The tracker consumes this through the `SearchProvider` trait so position
//! checks can be tested against scripted result sets. The concrete client
//! talks to a Serper-style endpoint and validates the response shape at the
//! boundary — missing URLs are rejected, optional fields get defaults.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

const SERP_API_URL: &str = "https://google.serper.dev/search";
/// Organic results requested per query. Positions past this are invisible
/// to the tracker, which is acceptable for rank-tracking purposes.
pub const RESULT_COUNT: usize = 100;
const CALL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum SerpError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Search request exceeded the {CALL_TIMEOUT_SECS}s deadline")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed search response: {0}")]
    Malformed(String),
}

/// One organic search result, already validated and defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub position: u32,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// Search-results collaborator boundary. `AppState` holds an
/// `Arc<dyn SearchProvider>` so tests can substitute scripted results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, language: &str) -> Result<Vec<SearchHit>, SerpError>;
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    position: u32,
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Clone)]
pub struct SerpClient {
    client: Client,
    api_key: String,
}

impl SerpClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(CALL_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl SearchProvider for SerpClient {
    async fn search(&self, query: &str, language: &str) -> Result<Vec<SearchHit>, SerpError> {
        let body = json!({
            "q": query,
            "gl": language,
            "hl": language,
            "num": RESULT_COUNT,
        });

        let response = self
            .client
            .post(SERP_API_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SerpError::Timeout
                } else {
                    SerpError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SerpError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SerpResponse = response
            .json()
            .await
            .map_err(|e| SerpError::Malformed(e.to_string()))?;

        debug!(
            "Search for '{}' ({}) returned {} organic results",
            query,
            language,
            parsed.organic.len()
        );

        Ok(parsed
            .organic
            .into_iter()
            .enumerate()
            .map(|(i, r)| SearchHit {
                // Some responses omit position; fall back to result order.
                position: if r.position == 0 {
                    i as u32 + 1
                } else {
                    r.position
                },
                url: r.link,
                title: r.title,
                snippet: r.snippet,
            })
            .collect())
    }
}
