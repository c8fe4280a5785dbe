//! Parsing of external (LLM) extractor output into [`ExternalCandidate`]s.
//!
//! Model output is rarely clean JSON: it may be fenced in Markdown, preceded
//! by prose, or carry items with missing or mistyped fields. The array is
//! located structurally and each item is read leniently.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::core::reference::ExternalCandidate;
use crate::parsing::ParseError;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").unwrap());

/// Parse extractor output, logging and returning an empty list on failure
#[must_use]
pub fn parse_response(response: &str) -> Vec<ExternalCandidate> {
    match try_parse_response(response) {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!("Could not parse extractor output: {}", e);
            tracing::debug!("Raw extractor output:\n{}", response);
            Vec::new()
        }
    }
}

/// Parse extractor output, skipping malformed items
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if no complete JSON array is present,
/// or `ParseError::Json` if the array is not valid JSON.
pub fn try_parse_response(response: &str) -> Result<Vec<ExternalCandidate>, ParseError> {
    let body = strip_code_fence(response);
    let array = extract_json_array(body)
        .ok_or_else(|| ParseError::InvalidFormat("No complete JSON array found".to_string()))?;

    let items: Vec<Value> = serde_json::from_str(array)?;
    let total = items.len();

    let candidates: Vec<ExternalCandidate> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let candidate = candidate_from_value(item);
            if candidate.is_none() {
                tracing::warn!("Skipping malformed extractor item {}: {}", i, item);
            }
            candidate
        })
        .collect();

    tracing::debug!("Parsed {}/{} extractor candidates", candidates.len(), total);

    Ok(candidates)
}

/// Inner text of the first Markdown code fence, or the whole input
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| text.trim(), |m| m.as_str())
}

/// First balanced `[...]` in `text`, ignoring brackets inside JSON strings
#[must_use]
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '[' if !in_string => depth += 1,
            ']' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn candidate_from_value(item: &Value) -> Option<ExternalCandidate> {
    let obj = item.as_object()?;

    let book_text = obj.get("book_text")?.as_str()?.trim();
    if book_text.is_empty() {
        return None;
    }

    let start = chapter_value(obj.get("start_chapter")?)?;
    let end = match obj.get("end_chapter") {
        None | Some(Value::Null) => start,
        Some(v) => chapter_value(v)?,
    };

    let mut candidate = ExternalCandidate::new(book_text, start, end);

    if let Some(raw) = obj.get("raw_text").and_then(Value::as_str) {
        candidate = candidate.with_raw_text(raw);
    }
    if let Some(confidence) = obj.get("confidence").and_then(Value::as_f64) {
        candidate = candidate.with_confidence(confidence.clamp(0.0, 1.0));
    }
    if let Some(source) = obj.get("source").and_then(Value::as_str) {
        candidate = candidate.with_source(source);
    }

    Some(candidate)
}

/// Non-negative integer, or a string holding one
fn chapter_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|v| u32::try_from(v).unwrap_or(u32::MAX)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
