//! Parsing of raw generator output.
//!
//! Models are asked for bare JSON but often wrap it in a fenced code block,
//! sometimes with a sentence before it. The first fenced block wins. Without
//! a closed block, a stray opening or closing marker is dropped and the rest
//! is parsed.

use craft_core::Element;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::{ResolveError, Result};

#[derive(Debug, Deserialize)]
struct GeneratedElement {
    new_element: Option<String>,
    emoji: Option<String>,
}

fn fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
    })
}

fn open_marker() -> &'static Regex {
    static OPEN: OnceLock<Regex> = OnceLock::new();
    OPEN.get_or_init(|| {
        Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?").expect("marker pattern is valid")
    })
}

/// Drop surrounding code-fence markers, if any.
pub fn strip_fences(raw: &str) -> &str {
    if let Some(body) = fence().captures(raw).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }

    let trimmed = raw.trim();
    let unopened = match open_marker().find(trimmed) {
        Some(marker) => &trimmed[marker.end()..],
        None => trimmed,
    };
    unopened.trim_end().trim_end_matches("```").trim()
}

/// Extract the element the model proposed.
pub fn parse_generated(raw: &str) -> Result<Element> {
    let cleaned = strip_fences(raw);
    let generated: GeneratedElement =
        serde_json::from_str(cleaned).map_err(|source| ResolveError::MalformedResponse {
            raw: raw.to_string(),
            source,
        })?;

    match (generated.new_element, generated.emoji) {
        (Some(name), Some(emoji)) => Element::checked(&name, &emoji).map_err(|e| {
            tracing::warn!(error = %e, "generator left a field blank");
            ResolveError::IncompleteResponse(raw.to_string())
        }),
        _ => Err(ResolveError::IncompleteResponse(raw.to_string())),
    }
}
