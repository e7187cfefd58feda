// All LLM prompt constants for the Drafts module.

/// System prompt for chunked article generation.
pub const DRAFT_SYSTEM: &str = "You are an experienced blog author writing long-form, \
    well-researched articles in markdown. \
    Write naturally and concretely; avoid filler phrases and marketing fluff. \
    Use ## for section headings and ### for subsections, exactly as given in the outline. \
    Never repeat sections you have already written.";

/// Per-chunk prompt template. Replace: {title}, {language}, {outline},
/// {context_tail}, {style_instruction}, {sections}, {conclusion_instruction}
pub const CHUNK_PROMPT_TEMPLATE: &str = r#"You are writing the article "{title}" in language "{language}".

FULL OUTLINE (for context — do NOT write all of it now):
{outline}

PREVIOUSLY WRITTEN (ending of the text so far; continue seamlessly from here):
{context_tail}

{style_instruction}

Write ONLY the following sections, in markdown, with their headings:
{sections}

{conclusion_instruction}"#;

/// Rotating stylistic openers so consecutive chunks do not all start the
/// same way. Selected by `chunk_index % 4`.
pub const STYLE_ROTATION: [&str; 4] = [
    "Open this part with a concrete example or a short scenario.",
    "Open this part with a surprising fact or a number.",
    "Open this part with a common mistake readers make.",
    "Open this part with a direct answer to the section heading.",
];

pub const CONCLUSION_FINAL: &str =
    "This is the final part of the article. Close the last section with a short, \
     natural conclusion for the whole article.";

pub const CONCLUSION_SUPPRESS: &str =
    "Do NOT write a conclusion or summary — more sections follow after this part.";

/// System prompt for FAQ extraction — enforces JSON-only output.
pub const FAQ_SYSTEM: &str = "You extract frequently-asked-question pairs from articles. \
    You MUST respond with valid JSON only — a JSON array of objects. \
    Do NOT include any text outside the JSON array.";

/// FAQ extraction prompt template. Replace `{draft}` before sending.
pub const FAQ_PROMPT_TEMPLATE: &str = r#"From the article below, extract 3 to 5 FAQ pairs a reader might search for.

Return a JSON ARRAY:
[
  {"question": "…?", "answer": "Two or three sentences."}
]

Rules:
1. Questions must be answerable from the article text alone.
2. Answers must be self-contained — no "as mentioned above".
3. Use the same language the article is written in.

ARTICLE:
{draft}"#;
