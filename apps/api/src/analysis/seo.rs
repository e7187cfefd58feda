//! SEO Analyzer — pure checklist scoring over article metadata and body.
//!
//! Every check runs on every call; absent metadata degrades to empty defaults
//! instead of erroring, so a half-written draft still gets a full report.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::urls::is_own_domain;

/// Article metadata as declared in the content store front matter.
/// All fields default so a draft missing any of them still scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub date: String,
    /// Declared focus keyword; picked up by the tracker on article save.
    #[serde(default)]
    pub keyword: String,
    /// Slugs of translated counterparts in other languages.
    #[serde(default)]
    pub siblings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeoCheck {
    pub id: &'static str,
    pub label: &'static str,
    pub value: Value,
    pub pass: bool,
    /// Direction of correction when the check fails; empty when it passes.
    pub hint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
    pub checks: Vec<SeoCheck>,
    /// round(100 × passed / total)
    pub score: u32,
}

const TITLE_MIN: usize = 40;
const TITLE_MAX: usize = 65;
const DESCRIPTION_MIN: usize = 100;
const DESCRIPTION_MAX: usize = 165;
const MIN_WORDS: usize = 800;
const MIN_H2: usize = 3;
const ANSWER_MIN_WORDS: usize = 30;
const ANSWER_MAX_WORDS: usize = 80;
const MIN_INTERNAL_LINKS: usize = 2;
const TAGS_MIN: usize = 2;
const TAGS_MAX: usize = 5;

/// Scores an article draft against the SEO checklist. Deterministic, no I/O.
pub fn analyze_seo(meta: &ArticleMeta, body: &str, site_domain: &str) -> SeoReport {
    let mut checks = Vec::with_capacity(10);

    let title_len = meta.title.chars().count();
    checks.push(range_check(
        "title-length",
        "Title length",
        title_len,
        TITLE_MIN,
        TITLE_MAX,
        "title",
        "characters",
    ));

    let description_len = meta.description.chars().count();
    checks.push(range_check(
        "description-length",
        "Description length",
        description_len,
        DESCRIPTION_MIN,
        DESCRIPTION_MAX,
        "description",
        "characters",
    ));

    let word_count = body.split_whitespace().count();
    checks.push(SeoCheck {
        id: "word-count",
        label: "Word count",
        value: json!(word_count),
        pass: word_count >= MIN_WORDS,
        hint: fail_hint(
            word_count >= MIN_WORDS,
            format!("Expand the article to at least {MIN_WORDS} words"),
        ),
    });

    let h2s = h2_headings(body);
    checks.push(SeoCheck {
        id: "h2-count",
        label: "H2 count",
        value: json!(h2s.len()),
        pass: h2s.len() >= MIN_H2,
        hint: fail_hint(
            h2s.len() >= MIN_H2,
            format!("Structure the article with at least {MIN_H2} H2 sections"),
        ),
    });

    let question_h2s = h2s.iter().filter(|h| h.trim_end().ends_with('?')).count();
    checks.push(SeoCheck {
        id: "h2-question",
        label: "H2 phrased as a question",
        value: json!(question_h2s),
        pass: question_h2s >= 1,
        hint: fail_hint(
            question_h2s >= 1,
            "Phrase at least one H2 as a question readers would search for".to_string(),
        ),
    });

    let answer_words = first_answer_block(body)
        .map(|p| p.split_whitespace().count())
        .unwrap_or(0);
    checks.push(SeoCheck {
        id: "answer-block",
        label: "Answer block after first H2",
        value: json!(answer_words),
        pass: (ANSWER_MIN_WORDS..=ANSWER_MAX_WORDS).contains(&answer_words),
        hint: if (ANSWER_MIN_WORDS..=ANSWER_MAX_WORDS).contains(&answer_words) {
            String::new()
        } else if answer_words < ANSWER_MIN_WORDS {
            format!(
                "Open the first H2 section with a direct answer of at least {ANSWER_MIN_WORDS} words"
            )
        } else {
            format!("Tighten the first answer paragraph to at most {ANSWER_MAX_WORDS} words")
        },
    });

    let internal_links = internal_link_count(body, site_domain);
    checks.push(SeoCheck {
        id: "internal-links",
        label: "Internal links",
        value: json!(internal_links),
        pass: internal_links >= MIN_INTERNAL_LINKS,
        hint: fail_hint(
            internal_links >= MIN_INTERNAL_LINKS,
            format!("Link to at least {MIN_INTERNAL_LINKS} other pages on your own site"),
        ),
    });

    checks.push(range_check(
        "tag-count",
        "Tag count",
        meta.tags.len(),
        TAGS_MIN,
        TAGS_MAX,
        "tag list",
        "tags",
    ));

    checks.push(SeoCheck {
        id: "siblings",
        label: "Sibling translations",
        value: json!(meta.siblings.len()),
        pass: !meta.siblings.is_empty(),
        hint: fail_hint(
            !meta.siblings.is_empty(),
            "Add at least one translated sibling so language versions cross-link".to_string(),
        ),
    });

    let has_date = !meta.date.trim().is_empty();
    checks.push(SeoCheck {
        id: "date",
        label: "Publication date set",
        value: json!(meta.date.trim()),
        pass: has_date,
        hint: fail_hint(has_date, "Set a publication date".to_string()),
    });

    let passed = checks.iter().filter(|c| c.pass).count();
    let score = ((passed as f64 / checks.len() as f64) * 100.0).round() as u32;

    SeoReport { checks, score }
}

fn range_check(
    id: &'static str,
    label: &'static str,
    value: usize,
    min: usize,
    max: usize,
    what: &str,
    unit: &str,
) -> SeoCheck {
    let pass = (min..=max).contains(&value);
    let hint = if pass {
        String::new()
    } else if value < min {
        format!("Lengthen the {what} to at least {min} {unit}")
    } else {
        format!("Shorten the {what} to at most {max} {unit}")
    };
    SeoCheck {
        id,
        label,
        value: json!(value),
        pass,
        hint,
    }
}

fn fail_hint(pass: bool, hint: String) -> String {
    if pass {
        String::new()
    } else {
        hint
    }
}

fn h2_headings(body: &str) -> Vec<&str> {
    body.lines()
        .map(str::trim)
        .filter_map(|l| l.strip_prefix("## "))
        .collect()
}

/// First non-heading paragraph after the first H2 — the featured-snippet
/// candidate. Heading lines between the H2 and the prose are skipped.
fn first_answer_block(body: &str) -> Option<String> {
    let mut past_first_h2 = false;
    let mut block: Vec<&str> = Vec::new();

    for line in body.lines() {
        let trimmed = line.trim();
        if !past_first_h2 {
            if trimmed.starts_with("## ") {
                past_first_h2 = true;
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if block.is_empty() {
                continue;
            }
            break;
        }
        block.push(trimmed);
    }

    if block.is_empty() {
        None
    } else {
        Some(block.join(" "))
    }
}

fn internal_link_count(body: &str, site_domain: &str) -> usize {
    let mut count = 0;
    let mut rest = body;
    while let Some(i) = rest.find("](") {
        let after = &rest[i + 2..];
        let Some(j) = after.find(')') else { break };
        // Drop an optional `"title"` part after the target.
        let target = after[..j].split_whitespace().next().unwrap_or("");
        if !target.is_empty() && is_own_domain(target, site_domain) {
            count += 1;
        }
        rest = &after[j + 1..];
    }
    count
}
