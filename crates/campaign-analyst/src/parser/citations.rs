//! Extraction of the embedded `[SOURCES:<json>]` citation block.
//!
//! The model client appends grounding sources to the response text as a
//! JSON array wrapped in `[SOURCES:` ... `]`. Extraction is best-effort: a
//! payload that does not parse is still stripped from the text, and the
//! failure is only logged.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::{CitationRecord, GroundingChunk};

/// Opening marker of a sources block.
pub const SOURCES_MARKER: &str = "[SOURCES:";

/// Non-greedy rule used when the payload is not a JSON value.
static FALLBACK_PAYLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\]").expect("valid fallback regex"));

/// Text with sources blocks removed, plus the citations they carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Displayable text, trimmed.
    pub text: String,

    /// Citations in the order they appeared.
    pub citations: Vec<CitationRecord>,
}

/// Remove every sources block from `text` and collect its citations.
#[must_use]
pub fn extract_citations(text: &str) -> Extraction {
    let mut cleaned = String::with_capacity(text.len());
    let mut citations = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(SOURCES_MARKER) {
        cleaned.push_str(&rest[..start]);
        let after_marker = &rest[start + SOURCES_MARKER.len()..];

        match split_payload(after_marker) {
            Some(Payload::Json { value, consumed }) => {
                collect_web_citations(value, &mut citations);
                rest = &after_marker[consumed..];
            }
            Some(Payload::Malformed { raw, consumed }) => {
                let error = serde_json::from_str::<Vec<GroundingChunk>>(raw)
                    .err()
                    .map_or_else(|| "not a sources array".to_string(), |e| e.to_string());
                tracing::warn!(payload_len = raw.len(), %error, "Could not parse grounding sources");
                rest = &after_marker[consumed..];
            }
            None => {
                // Unterminated marker: nothing to strip, keep it as text.
                cleaned.push_str(SOURCES_MARKER);
                rest = after_marker;
            }
        }
    }
    cleaned.push_str(rest);

    Extraction { text: cleaned.trim().to_string(), citations }
}

enum Payload<'a> {
    /// A JSON value followed by the closing `]`.
    Json { value: Value, consumed: usize },
    /// No JSON value; the payload runs to the first `]`.
    Malformed { raw: &'a str, consumed: usize },
}

/// Locate the end of the payload that follows `[SOURCES:`.
///
/// `consumed` counts bytes up to and including the closing `]`.
fn split_payload(input: &str) -> Option<Payload<'_>> {
    let mut values = serde_json::Deserializer::from_str(input).into_iter::<Value>();
    if let Some(Ok(value)) = values.next() {
        let end = values.byte_offset();
        let tail = &input[end..];
        let trimmed = tail.trim_start();
        if trimmed.starts_with(']') {
            let consumed = end + (tail.len() - trimmed.len()) + 1;
            return Some(Payload::Json { value, consumed });
        }
    }

    FALLBACK_PAYLOAD.captures(input).and_then(|caps| {
        let whole = caps.get(0)?;
        let raw = caps.get(1).map_or("", |m| m.as_str());
        Some(Payload::Malformed { raw, consumed: whole.end() })
    })
}

fn collect_web_citations(value: Value, out: &mut Vec<CitationRecord>) {
    match serde_json::from_value::<Vec<GroundingChunk>>(value) {
        Ok(chunks) => {
            out.extend(chunks.into_iter().filter_map(|c| c.web).filter(CitationRecord::has_uri));
        }
        Err(error) => {
            tracing::warn!(%error, "Grounding sources payload is not an array of chunks");
        }
    }
}
