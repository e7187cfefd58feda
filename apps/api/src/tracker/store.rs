//! Persisted keyword store — a single keyed JSON document on disk.
//!
//! All mutations are read-modify-write under one async mutex, and the file
//! replace is atomic (temp file + rename), so an operation either lands fully
//! or not at all. Cross-process locking is out of scope; the service is the
//! single writer.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::articles::write_json_atomic;
use crate::errors::AppError;
use crate::tracker::{KeywordSource, RankSnapshot, TrackedKeyword, HISTORY_CAP};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDoc {
    #[serde(default)]
    keywords: Vec<TrackedKeyword>,
}

pub struct KeywordStore {
    path: PathBuf,
    doc: Mutex<StoreDoc>,
}

impl KeywordStore {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let doc = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse keyword store: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDoc::default(),
            Err(e) => {
                return Err(
                    anyhow::Error::new(e).context(format!("read: {}", path.display()))
                );
            }
        };
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub async fn list(&self) -> Vec<TrackedKeyword> {
        self.doc.lock().await.keywords.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<TrackedKeyword> {
        self.doc
            .lock()
            .await
            .keywords
            .iter()
            .find(|k| k.id == id)
            .cloned()
    }

    /// Adds a keyword for tracking. Rejects a `(keyword, language)` pair that
    /// already exists, leaving the first record untouched.
    pub async fn add(
        &self,
        keyword: &str,
        language: &str,
        target_url: &str,
        target_page: &str,
        source: KeywordSource,
    ) -> Result<TrackedKeyword, AppError> {
        let normalized = normalize(keyword);
        if normalized.is_empty() {
            return Err(AppError::Validation("keyword cannot be empty".to_string()));
        }

        let mut doc = self.doc.lock().await;
        if find_mut(&mut doc, &normalized, language).is_some() {
            return Err(AppError::DuplicateKeyword(normalized));
        }

        let record = TrackedKeyword {
            id: Uuid::new_v4(),
            keyword: normalized,
            language: language.to_string(),
            target_url: target_url.to_string(),
            target_page: target_page.to_string(),
            added_at: Utc::now(),
            source,
            history: Vec::new(),
        };
        doc.keywords.push(record.clone());
        self.persist(&doc).await?;
        Ok(record)
    }

    /// Article-save side effect: tracks the article's focus keyword with
    /// `source=auto`, or re-points an existing auto entry when the slug
    /// changed. Never duplicates and never touches history.
    pub async fn sync_from_article(
        &self,
        keyword: &str,
        language: &str,
        target_url: &str,
        target_page: &str,
    ) -> Result<(), AppError> {
        let normalized = normalize(keyword);
        if normalized.is_empty() {
            return Ok(());
        }

        let mut doc = self.doc.lock().await;
        if let Some(existing) = find_mut(&mut doc, &normalized, language) {
            let moved = existing.target_url != target_url || existing.target_page != target_page;
            if existing.source == KeywordSource::Auto && moved {
                existing.target_url = target_url.to_string();
                existing.target_page = target_page.to_string();
                self.persist(&doc).await?;
            }
            return Ok(());
        }

        doc.keywords.push(TrackedKeyword {
            id: Uuid::new_v4(),
            keyword: normalized,
            language: language.to_string(),
            target_url: target_url.to_string(),
            target_page: target_page.to_string(),
            added_at: Utc::now(),
            source: KeywordSource::Auto,
            history: Vec::new(),
        });
        self.persist(&doc).await
    }

    /// Appends a snapshot, replacing any existing entry for the same calendar
    /// day and truncating history past the cap from the oldest end.
    pub async fn record_snapshot(
        &self,
        id: Uuid,
        snapshot: RankSnapshot,
    ) -> Result<(), AppError> {
        let mut doc = self.doc.lock().await;
        let keyword = doc
            .keywords
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| AppError::NotFound(format!("keyword {id}")))?;

        if let Some(existing) = keyword.history.iter_mut().find(|s| s.date == snapshot.date) {
            *existing = snapshot;
        } else {
            keyword.history.push(snapshot);
            if keyword.history.len() > HISTORY_CAP {
                let excess = keyword.history.len() - HISTORY_CAP;
                keyword.history.drain(..excess);
            }
        }
        self.persist(&doc).await
    }

    async fn persist(&self, doc: &StoreDoc) -> Result<(), AppError> {
        write_json_atomic(&self.path, doc)
            .await
            .context("persist keyword store")?;
        Ok(())
    }
}

fn normalize(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

fn find_mut<'a>(
    doc: &'a mut StoreDoc,
    normalized: &str,
    language: &str,
) -> Option<&'a mut TrackedKeyword> {
    doc.keywords
        .iter_mut()
        .find(|k| k.keyword == normalized && k.language.eq_ignore_ascii_case(language))
}
