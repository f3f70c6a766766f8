//! DOCX text extraction.
//!
//! A `.docx` file is a zip archive whose body text lives in
//! `word/document.xml`. The archive reader works on a file path, so the
//! payload is first written to a scratch [`tempfile::NamedTempFile`]; the
//! file is removed when the handle drops, on success and on every error path.

use crate::error::MenuError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const DOCUMENT_PART: &str = "word/document.xml";

/// Text-bearing markup, in document order: `<w:t>` runs, run-level tabs
/// (attribute-less, unlike `<w:tabs>` stop definitions), breaks and
/// paragraph ends. Everything else (`w:delText`, `w:instrText`, properties)
/// is never matched and so never reaches the output.
static RE_TEXT_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:(?:br|cr)\b[^>]*/>|</w:p>").unwrap()
});
static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_CHAR_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:x([0-9A-Fa-f]+)|([0-9]+));").unwrap());

/// Extract the text of an in-memory DOCX payload.
pub async fn extract_text(bytes: Vec<u8>, scratch_dir: Option<PathBuf>) -> Result<String, MenuError> {
    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes, scratch_dir.as_deref()))
        .await
        .map_err(|e| MenuError::Internal(format!("DOCX task panicked: {}", e)))?
}

fn extract_text_blocking(bytes: &[u8], scratch_dir: Option<&Path>) -> Result<String, MenuError> {
    let scratch = write_scratch_file(bytes, scratch_dir)?;
    debug!("DOCX written to scratch file {}", scratch.path().display());
    extract_text_from_path(scratch.path())
    // `scratch` dropped here: the file is deleted
}

fn write_scratch_file(
    bytes: &[u8],
    scratch_dir: Option<&Path>,
) -> Result<tempfile::NamedTempFile, MenuError> {
    let builder = {
        let mut b = tempfile::Builder::new();
        b.prefix("menu-").suffix(".docx");
        b
    };
    let mut file = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| MenuError::Internal(format!("tempfile: {e}")))?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| MenuError::Internal(format!("tempfile write: {e}")))?;
    Ok(file)
}

/// Extract the body text of the DOCX at `path`.
///
/// Only `<w:t>` text is kept. Paragraphs and breaks become newlines, run
/// tabs a tab; XML entities are unescaped.
pub fn extract_text_from_path(path: &Path) -> Result<String, MenuError> {
    let fail = |detail: String| MenuError::DocumentExtractionFailed { detail };

    let file = std::fs::File::open(path).map_err(|e| fail(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| fail(format!("not a zip archive: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| fail(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| fail(format!("reading {DOCUMENT_PART}: {e}")))?;

    Ok(xml_to_text(&xml))
}

/// Flatten WordprocessingML markup into plain text.
pub fn xml_to_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);

    for caps in RE_TEXT_MARKUP.captures_iter(xml) {
        if let Some(text) = caps.get(1) {
            out.push_str(&unescape_xml(text.as_str()));
        } else if caps[0].starts_with("<w:tab") {
            out.push('\t');
        } else {
            out.push('\n');
        }
    }

    RE_BLANK_RUNS.replace_all(&out, "\n\n").trim().to_string()
}

fn unescape_xml(s: &str) -> String {
    let s = RE_CHAR_REF.replace_all(s, |caps: &regex::Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
