//! Position checking — sequential, rate-limited queries against the
//! search-results collaborator.
//!
//! Keywords are checked one at a time with a fixed inter-call delay. This is
//! a rate-limit contract with the collaborator, not an optimization target:
//! the loop must never be parallelized. One keyword's failure is collected
//! into its result entry and the batch continues, so N keywords always yield
//! N outcomes.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::serp_client::{SearchHit, SearchProvider};
use crate::tracker::store::KeywordStore;
use crate::tracker::{RankMatch, RankSnapshot, TrackedKeyword};
use crate::urls::{is_own_domain, urls_match};

/// Fixed delay between consecutive collaborator calls.
pub const INTER_CHECK_DELAY: Duration = Duration::from_millis(800);

/// Per-keyword result of a batch check. `error` is set instead of the
/// ranking fields when the collaborator call failed for that keyword.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub keyword_id: Uuid,
    pub keyword: String,
    pub language: String,
    pub position: Option<u32>,
    pub found_url: Option<String>,
    pub cannibalization: bool,
    pub error: Option<String>,
}

/// Checks positions for one keyword (if an id is given) or all of them.
pub async fn check_positions(
    store: &KeywordStore,
    provider: &dyn SearchProvider,
    site_domain: &str,
    keyword_id: Option<Uuid>,
) -> Result<Vec<CheckOutcome>, AppError> {
    let keywords = match keyword_id {
        Some(id) => vec![store
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("keyword {id}")))?],
        None => store.list().await,
    };

    let mut outcomes = Vec::with_capacity(keywords.len());
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(INTER_CHECK_DELAY).await;
        }

        match provider.search(&keyword.keyword, &keyword.language).await {
            Ok(hits) => {
                let snapshot =
                    snapshot_from_hits(keyword, &hits, site_domain, Utc::now().date_naive());
                info!(
                    "Checked '{}' ({}): position {:?}, cannibalization={}",
                    keyword.keyword, keyword.language, snapshot.position, snapshot.cannibalization
                );
                outcomes.push(CheckOutcome {
                    keyword_id: keyword.id,
                    keyword: keyword.keyword.clone(),
                    language: keyword.language.clone(),
                    position: snapshot.position,
                    found_url: snapshot.found_url.clone(),
                    cannibalization: snapshot.cannibalization,
                    error: None,
                });
                store.record_snapshot(keyword.id, snapshot).await?;
            }
            Err(e) => {
                warn!(
                    "Position check failed for '{}' ({}): {e}",
                    keyword.keyword, keyword.language
                );
                outcomes.push(CheckOutcome {
                    keyword_id: keyword.id,
                    keyword: keyword.keyword.clone(),
                    language: keyword.language.clone(),
                    position: None,
                    found_url: None,
                    cannibalization: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(outcomes)
}

/// Builds a snapshot from one result page. The first own-domain hit in result
/// order wins; cannibalization is flagged when several own pages rank, or
/// when the one that ranks is not the declared target.
pub fn snapshot_from_hits(
    keyword: &TrackedKeyword,
    hits: &[SearchHit],
    site_domain: &str,
    date: NaiveDate,
) -> RankSnapshot {
    let all_matches: Vec<RankMatch> = hits
        .iter()
        .filter(|h| is_own_domain(&h.url, site_domain))
        .map(|h| RankMatch {
            position: h.position,
            url: h.url.clone(),
            title: h.title.clone(),
        })
        .collect();

    let first = all_matches.first();
    let cannibalization = all_matches.len() > 1
        || first.is_some_and(|m| !urls_match(&m.url, &keyword.target_url));

    RankSnapshot {
        date,
        position: first.map(|m| m.position),
        found_url: first.map(|m| m.url.clone()),
        all_matches,
        cannibalization,
    }
}
