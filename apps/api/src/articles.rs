//! Article store collaborator — the content directory of the blog.
//!
//! One JSON document per `(language, slug)`. The orchestrator writes finished
//! drafts here; the analyzers and the tracker auto-sync read from it. Writes
//! go through a temp file and rename so a crash never leaves a half-written
//! article behind.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date: String,
    /// Declared focus keyword, if any.
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub siblings: Vec<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ArticleStore {
    root: PathBuf,
}

impl ArticleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, language: &str, slug: &str) -> Result<PathBuf, AppError> {
        validate_segment(language)?;
        validate_segment(slug)?;
        Ok(self.root.join(language).join(format!("{slug}.json")))
    }

    pub async fn read(&self, language: &str, slug: &str) -> Result<ArticleRecord, AppError> {
        let path = self.path_for(language, slug)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("article {language}/{slug}")));
            }
            Err(e) => {
                return Err(AppError::Internal(
                    anyhow::Error::new(e).context(format!("read article {language}/{slug}")),
                ));
            }
        };
        let record = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse article {language}/{slug}"))?;
        Ok(record)
    }

    pub async fn write(
        &self,
        language: &str,
        slug: &str,
        record: &ArticleRecord,
    ) -> Result<(), AppError> {
        let path = self.path_for(language, slug)?;
        write_json_atomic(&path, record)
            .await
            .with_context(|| format!("write article {language}/{slug}"))?;
        Ok(())
    }

    pub async fn exists(&self, language: &str, slug: &str) -> Result<bool, AppError> {
        let path = self.path_for(language, slug)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}

fn validate_segment(segment: &str) -> Result<(), AppError> {
    if segment.is_empty()
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
    {
        return Err(AppError::Validation(format!(
            "invalid path segment: '{segment}'"
        )));
    }
    Ok(())
}

pub(crate) async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(value).context("serialize record")?;
    fs::write(&tmp, &bytes)
        .await
        .with_context(|| format!("write: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("rename into place: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: "Testing articles".to_string(),
            description: "desc".to_string(),
            tags: vec!["a".to_string()],
            date: "2026-08-01".to_string(),
            keyword: "testing".to_string(),
            siblings: vec![],
            body: "## H2\n\nBody text.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(dir.path());
        store.write("en", "my-post", &record()).await.unwrap();
        let read = store.read("en", "my-post").await.unwrap();
        assert_eq!(read.title, "Testing articles");
        assert_eq!(read.keyword, "testing");
        assert!(store.exists("en", "my-post").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_article_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(dir.path());
        let err = store.read("en", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(dir.path());
        let err = store.read("en", "../escape").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
