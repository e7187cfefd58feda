//! Readability Analyzer — Flesch Reading Ease over markdown prose.
//!
//! The syllable counter is an estimate (maximal vowel runs), which is what
//! the Flesch formula expects in practice. Non-English text gets an extended
//! vowel set so diacritic vowels are not miscounted as consonants.

use serde::{Deserialize, Serialize};

const LONG_SENTENCE_WORDS: usize = 25;
const VERY_LONG_SENTENCE_WORDS: usize = 40;
const LONG_PARAGRAPH_WORDS: usize = 100;
const LONG_SENTENCE_ISSUE_THRESHOLD: usize = 3;

const ASCII_VOWELS: &str = "aeiouy";
const EXTENDED_VOWELS: &str = "aeiouyąęóáéíúàèìòùâêîôûäëïöüãõ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleschLabel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadabilityReport {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub flesch_score: i32,
    pub flesch_label: FleschLabel,
    pub long_sentence_count: usize,
    pub very_long_sentence_count: usize,
    pub long_paragraph_count: usize,
    /// Empty means "no issues found" — distinct from "not yet computed",
    /// which callers represent by the absence of a report.
    pub issues: Vec<String>,
}

/// Scores body text for reading difficulty. Deterministic, no I/O.
pub fn analyze_readability(body: &str, language: &str) -> ReadabilityReport {
    let prose = strip_markdown(body);
    let vowels = vowel_set(language);

    let sentences: Vec<&str> = prose
        .split(|c| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let words: Vec<&str> = prose.split_whitespace().collect();
    let word_count = words.len();
    let sentence_count = sentences.len();

    let total_syllables: usize = words.iter().map(|w| syllables(w, vowels)).sum();

    let (avg_sentence_length, flesch_score) = if word_count == 0 || sentence_count == 0 {
        (0.0, 0)
    } else {
        let wps = word_count as f64 / sentence_count as f64;
        let spw = total_syllables as f64 / word_count as f64;
        (wps, flesch(wps, spw))
    };

    let flesch_label = if flesch_score >= 60 {
        FleschLabel::Easy
    } else if flesch_score >= 40 {
        FleschLabel::Medium
    } else {
        FleschLabel::Hard
    };

    let long_sentence_count = sentences
        .iter()
        .filter(|s| s.split_whitespace().count() > LONG_SENTENCE_WORDS)
        .count();
    let very_long_sentence_count = sentences
        .iter()
        .filter(|s| s.split_whitespace().count() > VERY_LONG_SENTENCE_WORDS)
        .count();
    let long_paragraph_count = long_paragraphs(body);

    let mut issues = Vec::new();
    if word_count > 0 {
        if very_long_sentence_count > 0 {
            issues.push(format!(
                "{very_long_sentence_count} sentence(s) exceed {VERY_LONG_SENTENCE_WORDS} words; split them up"
            ));
        }
        if long_sentence_count > LONG_SENTENCE_ISSUE_THRESHOLD {
            issues.push(format!(
                "{long_sentence_count} sentences exceed {LONG_SENTENCE_WORDS} words; consider shortening"
            ));
        }
        if long_paragraph_count > 0 {
            issues.push(format!(
                "{long_paragraph_count} paragraph(s) exceed {LONG_PARAGRAPH_WORDS} words; break them into smaller blocks"
            ));
        }
        if flesch_score < 40 {
            issues.push(
                "Overall the text is hard to read; shorten sentences and prefer simpler words"
                    .to_string(),
            );
        }
    }

    ReadabilityReport {
        word_count,
        sentence_count,
        avg_sentence_length,
        flesch_score,
        flesch_label,
        long_sentence_count,
        very_long_sentence_count,
        long_paragraph_count,
        issues,
    }
}

/// Flesch Reading Ease, rounded to the nearest integer.
fn flesch(words_per_sentence: f64, syllables_per_word: f64) -> i32 {
    (206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word).round() as i32
}

fn vowel_set(language: &str) -> &'static str {
    if language.to_lowercase().starts_with("en") {
        ASCII_VOWELS
    } else {
        EXTENDED_VOWELS
    }
}

/// Maximal vowel runs, minimum 1. Words of three letters or fewer count as
/// one syllable regardless of spelling.
fn syllables(word: &str, vowels: &str) -> usize {
    let cleaned: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if cleaned.len() <= 3 {
        return 1;
    }

    let mut count = 0;
    let mut prev_was_vowel = false;
    for c in cleaned {
        let is_vowel = vowels.contains(c);
        if is_vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_vowel;
    }
    count.max(1)
}

/// Reduces markdown to plain prose: heading/list/quote markers, emphasis,
/// inline code, and link syntax are removed; link text is kept.
fn strip_markdown(body: &str) -> String {
    let mut lines = String::new();
    for line in body.lines() {
        let trimmed = line.trim_start();
        let trimmed = trimmed.trim_start_matches('#').trim_start();
        let trimmed = trimmed
            .strip_prefix('>')
            .map(str::trim_start)
            .unwrap_or(trimmed);
        let trimmed = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .unwrap_or(trimmed);
        lines.push_str(trimmed);
        lines.push('\n');
    }
    strip_inline(&lines)
}

fn strip_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' | '_' | '`' | '[' => {}
            ']' => {
                // [text](target) — keep the text, drop the target
                if chars.peek() == Some(&'(') {
                    for c2 in chars.by_ref() {
                        if c2 == ')' {
                            break;
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Blank-line-delimited blocks of more than 100 words, headings excluded.
fn long_paragraphs(body: &str) -> usize {
    body.split("\n\n")
        .map(|block| {
            block
                .lines()
                .filter(|l| !l.trim_start().starts_with('#'))
                .flat_map(str::split_whitespace)
                .count()
        })
        .filter(|&words| words > LONG_PARAGRAPH_WORDS)
        .count()
}
