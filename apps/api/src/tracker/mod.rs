//! Keyword Rank Tracker — persistent keyword records with ranking history
//! and cannibalization detection.

pub mod check;
pub mod handlers;
pub mod report;
pub mod store;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weekly-check cadence over one year.
pub const HISTORY_CAP: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSource {
    /// Added explicitly by an editor.
    Manual,
    /// Created as a side effect of saving an article with a focus keyword.
    Auto,
    /// Imported from an initial seed list.
    Seed,
}

/// One own-domain search result observed during a position check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankMatch {
    pub position: u32,
    pub url: String,
    pub title: String,
}

/// One dated observation of a keyword's ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSnapshot {
    pub date: NaiveDate,
    pub position: Option<u32>,
    pub found_url: Option<String>,
    #[serde(default)]
    pub all_matches: Vec<RankMatch>,
    pub cannibalization: bool,
}

/// A keyword under tracking. Unique on `(keyword, language)`; never
/// implicitly deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedKeyword {
    pub id: Uuid,
    /// Stored lowercased and trimmed.
    pub keyword: String,
    pub language: String,
    /// Site-relative path the keyword is supposed to rank for.
    pub target_url: String,
    /// Slug of the target article.
    pub target_page: String,
    pub added_at: DateTime<Utc>,
    pub source: KeywordSource,
    #[serde(default)]
    pub history: Vec<RankSnapshot>,
}

impl TrackedKeyword {
    pub fn latest(&self) -> Option<&RankSnapshot> {
        self.history.last()
    }
}
