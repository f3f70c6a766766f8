//! Response sanitizing: turn a model's raw reply into a list of menu items.
//!
//! The prompt asks for a bare JSON array, but models frequently wrap it in
//! ` ```json … ``` ` fences anyway, or answer with prose when the document is
//! not a menu. This stage never fails: anything that is not a JSON array
//! after fence stripping yields an empty list.

use crate::output::MenuItem;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Opening fence with an optional language tag (`json`, `JSON`, `javascript`…).
static RE_OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+.\-]*").unwrap());

const CLOSING_FENCE: &str = "```";

/// Parse a raw model reply into menu items.
///
/// 1. Trim surrounding whitespace
/// 2. Strip a leading fence (with or without a language tag) and re-trim
/// 3. Strip a trailing fence and re-trim
/// 4. Strictly parse what remains as JSON
/// 5. Return the array elements verbatim; anything else yields `[]`
pub fn parse_menu_items(reply: &str) -> Vec<MenuItem> {
    let body = strip_fences(reply);

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => {
            debug!("Parsed {} items from model reply", items.len());
            items.into_iter().map(MenuItem).collect()
        }
        Ok(other) => {
            debug!("Model reply is JSON but not an array ({}); discarding", json_kind(&other));
            Vec::new()
        }
        Err(e) => {
            warn!("Failed to parse model reply as JSON: {}", e);
            Vec::new()
        }
    }
}

/// Remove an outer code fence, returning the trimmed inner text.
pub fn strip_fences(reply: &str) -> &str {
    let mut s = reply.trim();

    if let Some(m) = RE_OPENING_FENCE.find(s) {
        s = s[m.end()..].trim();
    }
    if let Some(inner) = s.strip_suffix(CLOSING_FENCE) {
        s = inner.trim();
    }

    s
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
