//! Cannibalization reporting — derived, read-only view over tracked keywords.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::tracker::TrackedKeyword;
use crate::urls::urls_match;

#[derive(Debug, Clone, Serialize)]
pub struct CannibalizationIssue {
    pub keyword: String,
    pub language: String,
    pub expected_url: String,
    pub actual_url: Option<String>,
    /// Every own-domain URL seen in the latest snapshot.
    pub competing_urls: Vec<String>,
    pub hint: String,
}

/// Keywords whose latest check resolved to the same page.
#[derive(Debug, Clone, Serialize)]
pub struct UrlGroup {
    pub url: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CannibalizationReport {
    pub issues: Vec<CannibalizationIssue>,
    pub shared_pages: Vec<UrlGroup>,
}

/// Builds the report from current tracker state. No I/O.
pub fn build_report(keywords: &[TrackedKeyword]) -> CannibalizationReport {
    let mut issues = Vec::new();
    let mut by_url: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for keyword in keywords {
        let Some(latest) = keyword.latest() else {
            continue;
        };

        if let Some(found) = &latest.found_url {
            by_url
                .entry(found.clone())
                .or_default()
                .push(format!("{} ({})", keyword.keyword, keyword.language));
        }

        if !latest.cannibalization {
            continue;
        }

        let hint = if latest.all_matches.len() > 1 {
            format!(
                "{} of your pages rank for this keyword; consolidate the content \
                 or set a canonical URL on the intended page",
                latest.all_matches.len()
            )
        } else {
            "The ranking URL differs from the target page; strengthen internal \
             links to the target or adjust canonicalization"
                .to_string()
        };

        issues.push(CannibalizationIssue {
            keyword: keyword.keyword.clone(),
            language: keyword.language.clone(),
            expected_url: keyword.target_url.clone(),
            actual_url: latest.found_url.clone(),
            competing_urls: latest.all_matches.iter().map(|m| m.url.clone()).collect(),
            hint,
        });
    }

    let shared_pages = by_url
        .into_iter()
        .filter(|(_, keywords)| keywords.len() > 1)
        .map(|(url, keywords)| UrlGroup { url, keywords })
        .collect();

    CannibalizationReport {
        issues,
        shared_pages,
    }
}

/// True when a keyword's latest snapshot still points at its target.
#[allow(dead_code)]
pub fn is_on_target(keyword: &TrackedKeyword) -> bool {
    keyword
        .latest()
        .and_then(|s| s.found_url.as_deref())
        .map(|url| urls_match(url, &keyword.target_url))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{KeywordSource, RankMatch, RankSnapshot};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn keyword_with_snapshot(
        name: &str,
        target: &str,
        found: Option<&str>,
        matches: Vec<&str>,
        cannibalization: bool,
    ) -> TrackedKeyword {
        TrackedKeyword {
            id: Uuid::new_v4(),
            keyword: name.to_string(),
            language: "en".to_string(),
            target_url: target.to_string(),
            target_page: "a".to_string(),
            added_at: Utc::now(),
            source: KeywordSource::Manual,
            history: vec![RankSnapshot {
                date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
                position: found.map(|_| 3),
                found_url: found.map(str::to_string),
                all_matches: matches
                    .iter()
                    .enumerate()
                    .map(|(i, url)| RankMatch {
                        position: i as u32 + 1,
                        url: url.to_string(),
                        title: String::new(),
                    })
                    .collect(),
                cannibalization,
            }],
        }
    }

    #[test]
    fn test_cannibalized_keyword_produces_issue() {
        let kw = keyword_with_snapshot(
            "seo audit",
            "/blog/a",
            Some("https://example.com/blog/b"),
            vec!["https://example.com/blog/b"],
            true,
        );
        let report = build_report(&[kw]);
        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.expected_url, "/blog/a");
        assert_eq!(issue.actual_url.as_deref(), Some("https://example.com/blog/b"));
        assert!(issue.hint.contains("canonicalization"));
    }

    #[test]
    fn test_multi_match_issue_hints_consolidation() {
        let kw = keyword_with_snapshot(
            "seo audit",
            "/blog/a",
            Some("https://example.com/blog/a"),
            vec!["https://example.com/blog/a", "https://example.com/blog/b"],
            true,
        );
        let report = build_report(&[kw]);
        assert!(report.issues[0].hint.contains("consolidate"));
        assert_eq!(report.issues[0].competing_urls.len(), 2);
    }

    #[test]
    fn test_clean_keywords_produce_no_issues() {
        let kw = keyword_with_snapshot(
            "seo audit",
            "/blog/a",
            Some("https://example.com/blog/a"),
            vec!["https://example.com/blog/a"],
            false,
        );
        let report = build_report(&[kw]);
        assert!(report.issues.is_empty());
        assert!(report.shared_pages.is_empty());
    }

    #[test]
    fn test_keywords_resolving_to_same_page_are_grouped() {
        let a = keyword_with_snapshot(
            "first",
            "/blog/a",
            Some("https://example.com/blog/shared"),
            vec!["https://example.com/blog/shared"],
            true,
        );
        let b = keyword_with_snapshot(
            "second",
            "/blog/b",
            Some("https://example.com/blog/shared"),
            vec!["https://example.com/blog/shared"],
            true,
        );
        let report = build_report(&[a, b]);
        assert_eq!(report.shared_pages.len(), 1);
        assert_eq!(report.shared_pages[0].keywords.len(), 2);
    }

    #[test]
    fn test_keyword_without_history_is_skipped() {
        let mut kw = keyword_with_snapshot("seo", "/blog/a", None, vec![], false);
        kw.history.clear();
        let report = build_report(&[kw]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_is_on_target() {
        let on = keyword_with_snapshot(
            "seo",
            "/blog/a",
            Some("https://example.com/blog/a"),
            vec!["https://example.com/blog/a"],
            false,
        );
        assert!(is_on_target(&on));
        let off = keyword_with_snapshot(
            "seo",
            "/blog/a",
            Some("https://example.com/blog/b"),
            vec!["https://example.com/blog/b"],
            true,
        );
        assert!(!is_on_target(&off));
    }
}
