//! Draft Generation — orchestrates the chunked generation pipeline.
//!
//! Flow: chunk outline → per-chunk LLM call with rolling context →
//!       best-effort FAQ extraction → persist article → auto-sync tracker.
//!
//! Chunk calls are strictly sequential: each prompt carries the tail of the
//! previous output. The draft is persisted BEFORE the response is returned,
//! so a caller whose connection times out after a long run can still find
//! the finished article in the store.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::articles::{ArticleRecord, ArticleStore};
use crate::drafts::outline::{chunk_outline, render_outline, OutlineSection};
use crate::drafts::progress::{DraftStatus, JobRegistry};
use crate::drafts::prompts::{
    CHUNK_PROMPT_TEMPLATE, CONCLUSION_FINAL, CONCLUSION_SUPPRESS, DRAFT_SYSTEM, FAQ_PROMPT_TEMPLATE,
    FAQ_SYSTEM, STYLE_ROTATION,
};
use crate::errors::AppError;
use crate::llm_client::repair::repair_json;
use crate::llm_client::TextGenerator;
use crate::tracker::store::KeywordStore;

/// Rolling context window: how much of the previous output each chunk sees.
const CONTEXT_TAIL_CHARS: usize = 1500;
/// Output budget per chunk call.
const CHUNK_MAX_TOKENS: u32 = 4096;
/// Output budget for the FAQ extraction call.
const FAQ_MAX_TOKENS: u32 = 1024;
/// How much of the draft the FAQ call sees.
const FAQ_INPUT_CHARS: usize = 12000;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateDraftRequest {
    pub title: String,
    pub language: String,
    pub outline: Vec<OutlineSection>,
    /// When set (with `language`), the finished draft is persisted to the
    /// article store under this slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Focus keyword; auto-synced into the tracker on save.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateDraftResponse {
    pub job_id: Uuid,
    pub body: String,
    pub word_count: usize,
    pub faq: Vec<FaqEntry>,
    /// Whether the draft was persisted to the article store.
    pub saved: bool,
}

/// Runs the full chunked generation pipeline.
///
/// On a chunk failure the job is left in a terminal `error` state with the
/// word count accumulated so far, nothing is persisted, and the error is
/// surfaced to the caller.
pub async fn generate_draft(
    llm: &dyn TextGenerator,
    jobs: &JobRegistry,
    articles: &ArticleStore,
    keywords: &KeywordStore,
    request: GenerateDraftRequest,
) -> Result<GenerateDraftResponse, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if request.outline.is_empty() {
        return Err(AppError::Validation(
            "outline must contain at least one section".to_string(),
        ));
    }

    let total_chunks = chunk_outline(&request.outline).len();
    let job_id = jobs
        .begin(
            &request.title,
            &request.language,
            request.slug.as_deref(),
            total_chunks,
        )
        .await?;

    info!(
        "Starting draft generation '{}' ({}): {} sections in {} chunks [job {job_id}]",
        request.title,
        request.language,
        request.outline.len(),
        total_chunks
    );

    match run(llm, jobs, articles, keywords, &request, job_id).await {
        Ok(response) => {
            jobs.finish(job_id, DraftStatus::Done, None).await;
            Ok(response)
        }
        Err(e) => {
            jobs.finish(job_id, DraftStatus::Error, Some(e.to_string()))
                .await;
            Err(e)
        }
    }
}

async fn run(
    llm: &dyn TextGenerator,
    jobs: &JobRegistry,
    articles: &ArticleStore,
    keywords: &KeywordStore,
    request: &GenerateDraftRequest,
    job_id: Uuid,
) -> Result<GenerateDraftResponse, AppError> {
    let chunks = chunk_outline(&request.outline);
    let outline_text = render_outline(&request.outline);
    let mut body = String::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let is_last = i + 1 == chunks.len();
        let prompt = build_chunk_prompt(request, &outline_text, chunk, i, is_last, tail(&body));

        let text = llm.generate(DRAFT_SYSTEM, &prompt, CHUNK_MAX_TOKENS).await?;
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        body.push_str(text.trim());

        let word_count = body.split_whitespace().count();
        let section_label = chunk
            .last()
            .map(|s| s.heading.clone())
            .unwrap_or_default();
        jobs.update(job_id, |p| {
            p.chunk_index = i + 1;
            p.current_section = section_label;
            p.word_count = word_count;
        })
        .await;
        info!(
            "Chunk {}/{} done: {} words so far [job {job_id}]",
            i + 1,
            chunks.len(),
            word_count
        );
    }

    let faq = extract_faq(llm, &body).await;

    let mut saved = false;
    if let Some(slug) = &request.slug {
        let record = ArticleRecord {
            title: request.title.clone(),
            description: request.description.clone(),
            tags: request.tags.clone(),
            date: chrono::Utc::now().date_naive().to_string(),
            keyword: request.keyword.clone().unwrap_or_default(),
            siblings: Vec::new(),
            body: body.clone(),
        };
        articles.write(&request.language, slug, &record).await?;
        info!("Draft persisted as {}/{slug} [job {job_id}]", request.language);

        if let Some(keyword) = &request.keyword {
            let target_url = format!("/{}/blog/{slug}", request.language);
            keywords
                .sync_from_article(keyword, &request.language, &target_url, slug)
                .await?;
        }
        saved = true;
    }

    Ok(GenerateDraftResponse {
        job_id,
        word_count: body.split_whitespace().count(),
        body,
        faq,
        saved,
    })
}

fn build_chunk_prompt(
    request: &GenerateDraftRequest,
    outline_text: &str,
    chunk: &[OutlineSection],
    chunk_index: usize,
    is_last: bool,
    context_tail: &str,
) -> String {
    let sections = render_outline(chunk);
    let context_tail = if context_tail.is_empty() {
        "(nothing yet — this is the beginning of the article)"
    } else {
        context_tail
    };
    let conclusion_instruction = if is_last {
        CONCLUSION_FINAL
    } else {
        CONCLUSION_SUPPRESS
    };

    CHUNK_PROMPT_TEMPLATE
        .replace("{title}", &request.title)
        .replace("{language}", &request.language)
        .replace("{outline}", outline_text)
        .replace("{context_tail}", context_tail)
        .replace("{style_instruction}", STYLE_ROTATION[chunk_index % STYLE_ROTATION.len()])
        .replace("{sections}", &sections)
        .replace("{conclusion_instruction}", conclusion_instruction)
}

/// Bounded tail of the accumulated draft, respecting char boundaries.
fn tail(body: &str) -> &str {
    if body.len() <= CONTEXT_TAIL_CHARS {
        return body;
    }
    let mut start = body.len() - CONTEXT_TAIL_CHARS;
    while !body.is_char_boundary(start) {
        start += 1;
    }
    &body[start..]
}

/// Best-effort FAQ extraction. A failure here is logged and the draft
/// proceeds without FAQs — it never fails the run.
async fn extract_faq(llm: &dyn TextGenerator, body: &str) -> Vec<FaqEntry> {
    let excerpt = if body.len() > FAQ_INPUT_CHARS {
        let mut end = FAQ_INPUT_CHARS;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        &body[..end]
    } else {
        body
    };
    let prompt = FAQ_PROMPT_TEMPLATE.replace("{draft}", excerpt);

    let text = match llm.generate(FAQ_SYSTEM, &prompt, FAQ_MAX_TOKENS).await {
        Ok(text) => text,
        Err(e) => {
            warn!("FAQ extraction call failed: {e}");
            return Vec::new();
        }
    };

    match repair_json(&text).map(serde_json::from_value::<Vec<FaqEntry>>) {
        Ok(Ok(faq)) => faq,
        Ok(Err(e)) => {
            warn!("FAQ response had unexpected shape: {e}");
            Vec::new()
        }
        Err(e) => {
            warn!("FAQ response was not repairable: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted generator: returns queued replies in order and records every
    /// prompt it was given.
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _system: &str,
            prompt: &str,
            _max_output_tokens: u32,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    fn outline(n: usize) -> Vec<OutlineSection> {
        (0..n)
            .map(|i| OutlineSection {
                heading: format!("Section {i}"),
                subheadings: vec![],
            })
            .collect()
    }

    fn request(slug: Option<&str>) -> GenerateDraftRequest {
        GenerateDraftRequest {
            title: "Tracking keyword rankings".to_string(),
            language: "en".to_string(),
            outline: outline(5),
            slug: slug.map(str::to_string),
            keyword: Some("rank tracking".to_string()),
            description: "How to track rankings".to_string(),
            tags: vec!["seo".to_string()],
        }
    }

    async fn stores() -> (tempfile::TempDir, ArticleStore, KeywordStore) {
        let dir = tempfile::tempdir().unwrap();
        let articles = ArticleStore::new(dir.path().join("content"));
        let keywords = KeywordStore::open(dir.path().join("keywords.json"))
            .await
            .unwrap();
        (dir, articles, keywords)
    }

    #[tokio::test]
    async fn test_successful_run_persists_and_syncs_keyword() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("## Section 0\n\nChunk one text here.".to_string()),
            Ok("## Section 2\n\nChunk two text here.".to_string()),
            Ok("## Section 4\n\nChunk three text here.".to_string()),
            Ok(r#"```json
[{"question": "What is it?", "answer": "A thing."}]
```"#
                .to_string()),
        ]);

        let response = generate_draft(&llm, &jobs, &articles, &keywords, request(Some("my-post")))
            .await
            .unwrap();

        assert!(response.saved);
        assert_eq!(response.faq.len(), 1);
        assert!(response.body.contains("Chunk one text"));
        assert!(response.body.contains("Chunk three text"));

        let saved = articles.read("en", "my-post").await.unwrap();
        assert_eq!(saved.title, "Tracking keyword rankings");
        assert_eq!(saved.keyword, "rank tracking");

        let tracked = keywords.list().await;
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].keyword, "rank tracking");
        assert_eq!(tracked[0].target_url, "/en/blog/my-post");
    }

    #[tokio::test]
    async fn test_only_last_chunk_prompt_asks_for_conclusion() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Ok("[]".to_string()),
        ]);

        generate_draft(&llm, &jobs, &articles, &keywords, request(None))
            .await
            .unwrap();

        let prompts = llm.prompts();
        // 3 chunk prompts + 1 FAQ prompt.
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("Do NOT write a conclusion"));
        assert!(prompts[1].contains("Do NOT write a conclusion"));
        assert!(prompts[2].contains("final part of the article"));
    }

    #[tokio::test]
    async fn test_style_instruction_rotates_per_chunk() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Ok("[]".to_string()),
        ]);

        generate_draft(&llm, &jobs, &articles, &keywords, request(None))
            .await
            .unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].contains(STYLE_ROTATION[0]));
        assert!(prompts[1].contains(STYLE_ROTATION[1]));
        assert!(prompts[2].contains(STYLE_ROTATION[2]));
    }

    #[tokio::test]
    async fn test_chunk_prompt_carries_previous_tail() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("A distinctive ending sentence.".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Ok("[]".to_string()),
        ]);

        generate_draft(&llm, &jobs, &articles, &keywords, request(None))
            .await
            .unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].contains("nothing yet"));
        assert!(prompts[1].contains("A distinctive ending sentence."));
    }

    #[tokio::test]
    async fn test_mid_run_failure_leaves_error_state_and_persists_nothing() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("Chunk one carries seven words in total.".to_string()),
            Err(LlmError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            }),
        ]);

        let err = generate_draft(&llm, &jobs, &articles, &keywords, request(Some("my-post")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Collaborator(_)));

        let all_jobs = jobs.list().await;
        let progress = &all_jobs[0];
        assert_eq!(progress.status, DraftStatus::Error);
        assert!(progress.error.as_deref().unwrap().contains("upstream"));
        // Words from chunk 1 are preserved for inspection.
        assert_eq!(progress.word_count, 7);
        assert_eq!(progress.chunk_index, 1);

        // Nothing was persisted as a finished article.
        assert!(!articles.exists("en", "my-post").await.unwrap());
        assert!(keywords.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_surfaces_distinct_error() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![Err(LlmError::Timeout)]);

        let err = generate_draft(&llm, &jobs, &articles, &keywords, request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CollaboratorTimeout(_)));
    }

    #[tokio::test]
    async fn test_faq_failure_does_not_fail_the_run() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Ok("Sorry, no JSON today.".to_string()),
        ]);

        let response = generate_draft(&llm, &jobs, &articles, &keywords, request(Some("p")))
            .await
            .unwrap();
        assert!(response.faq.is_empty());
        assert!(response.saved);
    }

    #[tokio::test]
    async fn test_truncated_faq_json_is_repaired() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Ok(r#"[{"question": "Why?", "answer": "Because."}, {"question": "How?", "answer": "Like so"#
                .to_string()),
        ]);

        let response = generate_draft(&llm, &jobs, &articles, &keywords, request(None))
            .await
            .unwrap();
        assert_eq!(response.faq.len(), 2);
        assert_eq!(response.faq[1].answer, "Like so");
    }

    #[tokio::test]
    async fn test_empty_outline_is_rejected_before_any_call() {
        let (_dir, articles, keywords) = stores().await;
        let jobs = JobRegistry::new();
        let llm = ScriptedGenerator::new(vec![]);
        let mut req = request(None);
        req.outline.clear();

        let err = generate_draft(&llm, &jobs, &articles, &keywords, req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(llm.prompts().is_empty());
    }
}
