//! The extraction prompt sent with every content unit.
//!
//! Kept in one place so tests can assert on it and so the reply contract the
//! sanitizer relies on (a bare JSON array, `[]` when empty) is visible next
//! to the instruction that asks for it.

/// Instruction sent alongside each unit. Constant across units and requests.
pub const EXTRACTION_PROMPT: &str = "Analyze this. If it is a restaurant menu, extract every dish as JSON. \
Required structure per dish: {\"name\":\"string\",\"description\":\"string\",\"price\":\"string\",\"quantity\":\"string\"} (all strings). \
Return ONLY the JSON, no commentary, no code fences, no additional text. \
If there are no dishes, return exactly: []";

/// Build the text of a user turn for a text unit: the document, then the
/// instruction.
pub fn text_unit_message(document_text: &str) -> String {
    format!("{document_text}\n\n{EXTRACTION_PROMPT}")
}
