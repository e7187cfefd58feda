//! Job-keyed generation progress.
//!
//! Each run gets its own registry entry under a generated job id, so
//! concurrent runs for different articles never collide. A second run for
//! the same `(language, slug)` is rejected while the first is in flight.
//! Terminal entries linger for a grace period so a polling caller can still
//! read the final state, then disappear.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Duration;
use uuid::Uuid;

use crate::errors::AppError;

/// How long a finished job stays visible to pollers.
pub const CLEANUP_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Generating,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftProgress {
    pub job_id: Uuid,
    pub slug: Option<String>,
    pub language: String,
    pub title: String,
    /// Chunks completed so far.
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub current_section: String,
    pub status: DraftStatus,
    pub started_at: DateTime<Utc>,
    /// Words accumulated across completed chunks. Preserved on error so a
    /// failed run is still inspectable.
    pub word_count: usize,
    pub error: Option<String>,
}

#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<Mutex<HashMap<Uuid, DraftProgress>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new run and returns its job id. Rejects a second run for
    /// the same `(language, slug)` while one is still generating.
    pub async fn begin(
        &self,
        title: &str,
        language: &str,
        slug: Option<&str>,
        total_chunks: usize,
    ) -> Result<Uuid, AppError> {
        let mut jobs = self.inner.lock().await;

        if let Some(slug) = slug {
            let busy = jobs.values().any(|p| {
                p.status == DraftStatus::Generating
                    && p.language == language
                    && p.slug.as_deref() == Some(slug)
            });
            if busy {
                return Err(AppError::Conflict(format!(
                    "draft generation already running for {language}/{slug}"
                )));
            }
        }

        let job_id = Uuid::new_v4();
        jobs.insert(
            job_id,
            DraftProgress {
                job_id,
                slug: slug.map(str::to_string),
                language: language.to_string(),
                title: title.to_string(),
                chunk_index: 0,
                total_chunks,
                current_section: String::new(),
                status: DraftStatus::Generating,
                started_at: Utc::now(),
                word_count: 0,
                error: None,
            },
        );
        Ok(job_id)
    }

    pub async fn update(&self, job_id: Uuid, apply: impl FnOnce(&mut DraftProgress)) {
        if let Some(progress) = self.inner.lock().await.get_mut(&job_id) {
            apply(progress);
        }
    }

    /// Moves a job to a terminal state and schedules its removal.
    pub async fn finish(&self, job_id: Uuid, status: DraftStatus, error: Option<String>) {
        {
            let mut jobs = self.inner.lock().await;
            if let Some(progress) = jobs.get_mut(&job_id) {
                progress.status = status;
                progress.error = error;
            }
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(CLEANUP_GRACE).await;
            inner.lock().await.remove(&job_id);
        });
    }

    pub async fn get(&self, job_id: Uuid) -> Option<DraftProgress> {
        self.inner.lock().await.get(&job_id).cloned()
    }

    pub async fn list(&self) -> Vec<DraftProgress> {
        let mut jobs: Vec<_> = self.inner.lock().await.values().cloned().collect();
        jobs.sort_by_key(|p| p.started_at);
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_begin_returns_distinct_job_ids() {
        let registry = JobRegistry::new();
        let a = registry.begin("A", "en", Some("a"), 3).await.unwrap();
        let b = registry.begin("B", "en", Some("b"), 3).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_for_same_slug_is_rejected() {
        let registry = JobRegistry::new();
        registry.begin("A", "en", Some("a"), 3).await.unwrap();
        let err = registry.begin("A again", "en", Some("a"), 3).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // Different language is a different target.
        registry.begin("A po polsku", "pl", Some("a"), 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_finished_run_frees_the_slug() {
        let registry = JobRegistry::new();
        let id = registry.begin("A", "en", Some("a"), 3).await.unwrap();
        registry.finish(id, DraftStatus::Done, None).await;
        registry.begin("A redo", "en", Some("a"), 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_runs_without_slug_do_not_conflict() {
        let registry = JobRegistry::new();
        registry.begin("A", "en", None, 3).await.unwrap();
        registry.begin("B", "en", None, 3).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_job_is_cleaned_up_after_grace_period() {
        let registry = JobRegistry::new();
        let id = registry.begin("A", "en", Some("a"), 3).await.unwrap();
        registry
            .finish(id, DraftStatus::Error, Some("boom".to_string()))
            .await;

        // Still visible right after finishing.
        let progress = registry.get(id).await.unwrap();
        assert_eq!(progress.status, DraftStatus::Error);
        assert_eq!(progress.error.as_deref(), Some("boom"));

        tokio::time::sleep(CLEANUP_GRACE + Duration::from_secs(1)).await;
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_update_mutates_progress() {
        let registry = JobRegistry::new();
        let id = registry.begin("A", "en", None, 3).await.unwrap();
        registry
            .update(id, |p| {
                p.chunk_index = 2;
                p.word_count = 940;
                p.current_section = "Section two".to_string();
            })
            .await;
        let progress = registry.get(id).await.unwrap();
        assert_eq!(progress.chunk_index, 2);
        assert_eq!(progress.word_count, 940);
    }
}
