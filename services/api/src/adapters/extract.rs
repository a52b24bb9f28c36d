//! services/api/src/adapters/extract.rs
//!
//! Helpers for pulling a JSON payload out of free-form LLM output. Models
//! are told to reply with bare JSON but routinely wrap it in code fences or
//! prose, so every AI adapter parses through here.

use regex::Regex;
use serde::de::DeserializeOwned;

/// Extracts the first JSON object or array embedded in `text` and
/// deserializes it. Returns None when no parseable payload is present.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    // Prefer an explicit ```json fence when the model used one.
    let fence = Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap();
    if let Some(captures) = fence.captures(text) {
        if let Ok(value) = serde_json::from_str::<T>(captures[1].trim()) {
            return Some(value);
        }
    }

    // Otherwise take the widest brace- or bracket-delimited span.
    let bare = Regex::new(r"(?s)(\{.*\}|\[.*\])").unwrap();
    let captures = bare.captures(text)?;
    serde_json::from_str::<T>(captures[1].trim()).ok()
}
