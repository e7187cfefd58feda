//! Outline chunking for multi-round generation.
//!
//! Two sections per call keeps each generation request inside a bounded
//! output-token budget while the rolling context window preserves narrative
//! continuity between calls.

use serde::{Deserialize, Serialize};

pub const SECTIONS_PER_CHUNK: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    #[serde(default)]
    pub subheadings: Vec<String>,
}

pub fn chunk_outline(outline: &[OutlineSection]) -> Vec<&[OutlineSection]> {
    outline.chunks(SECTIONS_PER_CHUNK).collect()
}

/// Renders the full outline for prompt context.
pub fn render_outline(outline: &[OutlineSection]) -> String {
    let mut out = String::new();
    for section in outline {
        out.push_str("## ");
        out.push_str(&section.heading);
        out.push('\n');
        for sub in &section.subheadings {
            out.push_str("  - ");
            out.push_str(sub);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(n: usize) -> Vec<OutlineSection> {
        (0..n)
            .map(|i| OutlineSection {
                heading: format!("Section {i}"),
                subheadings: vec![],
            })
            .collect()
    }

    #[test]
    fn test_five_sections_make_three_chunks() {
        let outline = sections(5);
        let chunks = chunk_outline(&outline);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[1].len(), 2);
        assert_eq!(chunks[2].len(), 1);
    }

    #[test]
    fn test_single_section_makes_one_chunk() {
        let outline = sections(1);
        assert_eq!(chunk_outline(&outline).len(), 1);
    }

    #[test]
    fn test_render_outline_includes_subheadings() {
        let outline = vec![OutlineSection {
            heading: "What is rank tracking?".to_string(),
            subheadings: vec!["Why weekly checks".to_string()],
        }];
        let rendered = render_outline(&outline);
        assert!(rendered.contains("## What is rank tracking?"));
        assert!(rendered.contains("  - Why weekly checks"));
    }
}
