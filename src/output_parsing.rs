//! Output parsing helpers shared by category runners and the security
//! sub-orchestrator (spec §9): a brace-matching extractor for JSON objects
//! embedded in noisy stdout/stderr, and line-oriented NDJSON parsing.

use serde::de::DeserializeOwned;

/// Extract the first balanced `{ ... }` object from `text`, ignoring braces
/// that occur inside string literals (honoring `\"` escapes), and parse it
/// as `T`. Returns `None` if no balanced object is found; callers treat that
/// as malformed output subject to the retry policy (spec §4.4, §9).
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = None;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let ch = byte as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    let end = end?;
    serde_json::from_str(&text[start..end]).ok()
}

/// Parse newline-delimited JSON: each non-blank line is independently
/// deserialized as `T`. A line that fails to parse is skipped rather than
/// failing the whole stream — NDJSON producers (vulnerability/secret
/// scanners, spec §4.5) sometimes interleave a non-JSON progress line.
/// Returns `None` only when *zero* lines parsed out of non-empty input,
/// which callers treat as malformed output.
pub fn parse_ndjson<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    let mut values = Vec::new();
    let mut saw_any_line = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        saw_any_line = true;
        if let Ok(value) = serde_json::from_str::<T>(trimmed) {
            values.push(value);
        }
    }
    if saw_any_line && values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Parse a JSON array document, tolerating the "JSON array OR NDJSON" dual
/// shape the secret scanner adapter emits (spec §4.5).
pub fn parse_array_or_ndjson<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).ok();
    }
    parse_ndjson(text)
}
