//! JSON repair for text-generation responses.
//!
//! Models asked for structured output routinely wrap JSON in markdown fences,
//! prepend prose, or get truncated mid-structure when they hit the output
//! token limit. `repair_json` recovers a value where a mechanical fix exists:
//! fence stripping, closing an unbalanced string, dropping a dangling comma or
//! half-written key, and balancing brackets. Anything beyond that is a
//! terminal per-call failure — no dynamic evaluation, no second repair pass.

use serde_json::Value;
use thiserror::Error;

/// Carries the original parse error so callers can log what the model sent.
#[derive(Debug, Error)]
#[error("JSON repair failed: {0}")]
pub struct RepairError(pub String);

/// Recovers a JSON value from possibly fenced or truncated model output.
pub fn repair_json(text: &str) -> Result<Value, RepairError> {
    let stripped = strip_code_fence(text.trim());

    // A response with no object or array at all is not repairable.
    let start = stripped
        .find(['{', '['])
        .ok_or_else(|| RepairError("no JSON object or array in response".to_string()))?;
    let candidate = stripped[start..].trim_end();

    let original_err = match serde_json::from_str(candidate) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let repaired = balance(candidate);
    serde_json::from_str(&repaired).map_err(|_| RepairError(original_err.to_string()))
}

/// Strips a single ```json ... ``` or ``` ... ``` fence wrapper if present.
fn strip_code_fence(text: &str) -> &str {
    let inner = if let Some(rest) = text.strip_prefix("```json") {
        rest
    } else if let Some(rest) = text.strip_prefix("```") {
        rest
    } else {
        return text;
    };
    let inner = inner.trim_start();
    inner
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(inner)
}

/// One repair pass: close an open string, drop a truncated tail, then append
/// whatever closers the bracket stack still expects.
fn balance(text: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut fixed = text.trim_end().to_string();
    if in_string {
        fixed.push('"');
    }
    trim_dangling_tail(&mut fixed);
    while let Some(closer) = stack.pop() {
        fixed.push(closer);
    }
    fixed
}

/// Removes a trailing `,` or a half-written `"key":` fragment (with its
/// preceding comma) so the appended closers produce valid JSON.
fn trim_dangling_tail(fixed: &mut String) {
    truncate_end_whitespace(fixed);

    if fixed.ends_with(',') {
        fixed.pop();
        return;
    }

    if fixed.ends_with(':') {
        fixed.pop();
        truncate_end_whitespace(fixed);
        if fixed.ends_with('"') {
            if let Some(open) = fixed[..fixed.len() - 1].rfind('"') {
                fixed.truncate(open);
            }
        }
        truncate_end_whitespace(fixed);
        if fixed.ends_with(',') {
            fixed.pop();
        }
    }
}

fn truncate_end_whitespace(s: &mut String) {
    let len = s.trim_end().len();
    s.truncate(len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json_parses() {
        let value = repair_json("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_bare_fence_parses() {
        let value = repair_json("```\n[1, 2, 3]\n```").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_valid_json_passes_through() {
        let value = repair_json(r#"{"q": "What?", "a": "That."}"#).unwrap();
        assert_eq!(value["q"], "What?");
    }

    #[test]
    fn test_prose_preamble_is_discarded() {
        let value = repair_json("Here is the JSON you asked for: {\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_truncated_array_is_closed() {
        let value = repair_json(r#"{"a": [1,2"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_truncated_mid_string_is_closed() {
        let value = repair_json(r#"{"a": "x"#).unwrap();
        assert_eq!(value, json!({"a": "x"}));
    }

    #[test]
    fn test_trailing_comma_is_dropped() {
        let value = repair_json(r#"{"a": 1,"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_dangling_key_fragment_is_dropped() {
        let value = repair_json(r#"{"a": 1, "b":"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_nested_truncation() {
        let value = repair_json(r#"[{"q": "Why?", "a": "Because"}, {"q": "How"#).unwrap();
        assert_eq!(value[0]["a"], "Because");
        assert_eq!(value[1]["q"], "How");
    }

    #[test]
    fn test_brackets_inside_strings_do_not_confuse_balancing() {
        let value = repair_json(r#"{"a": "list: [1,2]", "b": [3"#).unwrap();
        assert_eq!(value["a"], "list: [1,2]");
        assert_eq!(value["b"], json!([3]));
    }

    #[test]
    fn test_plain_prose_fails() {
        let err = repair_json("Sorry, I cannot produce that.").unwrap_err();
        assert!(err.to_string().contains("no JSON"));
    }

    #[test]
    fn test_unrepairable_carries_original_error() {
        // Balanced but genuinely invalid: repair cannot help.
        let err = repair_json("{]").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
