//! Media type detection: decide once which conversion strategy applies.
//!
//! The declared `Content-Type` wins; when the server sends none, the
//! extension of the last URL path segment is used as a guess. The result is
//! a closed [`DocumentKind`] so the conversion step is a single exhaustive
//! `match`.

use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

/// Conversion strategy selected for a fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    /// Rasterise every page; one unit per page.
    Pdf,
    /// The payload is one image unit. Holds the normalised media type.
    Image(String),
    /// Office Open XML word-processing document; one text unit.
    Word,
    /// UTF-8 text; one text unit.
    PlainText,
    /// Anything else. Holds the media type for the error message, or
    /// `"unknown"` when none could be determined.
    Unsupported(String),
}

impl DocumentKind {
    /// Classify a normalised media type.
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type {
            MIME_PDF => DocumentKind::Pdf,
            MIME_DOCX => DocumentKind::Word,
            MIME_TEXT => DocumentKind::PlainText,
            m if m.starts_with("image/") => DocumentKind::Image(m.to_string()),
            "" => DocumentKind::Unsupported("unknown".to_string()),
            other => DocumentKind::Unsupported(other.to_string()),
        }
    }
}

/// Detect the document kind from the response header, falling back to the URL.
pub fn detect(content_type: Option<&str>, url: &str) -> DocumentKind {
    let media_type = content_type
        .map(normalise_media_type)
        .filter(|m| !m.is_empty())
        .or_else(|| guess_from_url(url).map(str::to_string))
        .unwrap_or_default();

    let kind = DocumentKind::from_media_type(&media_type);
    debug!("Detected media type '{}' → {:?}", media_type, kind);
    kind
}

/// Drop parameters (`; charset=…`), trim, lowercase.
pub fn normalise_media_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Guess a media type from the extension of the last path segment.
pub fn guess_from_url(url: &str) -> Option<&'static str> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;

    let mime = match ext.to_ascii_lowercase().as_str() {
        "pdf" => MIME_PDF,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "docx" => MIME_DOCX,
        "txt" => MIME_TEXT,
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_classification() {
        let url = "https://example.com/file";
        assert_eq!(detect(Some("application/pdf"), url), DocumentKind::Pdf);
        assert_eq!(
            detect(Some("image/jpeg"), url),
            DocumentKind::Image("image/jpeg".into())
        );
        assert_eq!(detect(Some(MIME_DOCX), url), DocumentKind::Word);
        assert_eq!(detect(Some("text/plain"), url), DocumentKind::PlainText);
        assert_eq!(
            detect(Some("application/zip"), url),
            DocumentKind::Unsupported("application/zip".into())
        );
    }

    #[test]
    fn header_parameters_and_case_are_ignored() {
        let url = "https://example.com/file";
        assert_eq!(
            detect(Some("text/plain; charset=utf-8"), url),
            DocumentKind::PlainText
        );
        assert_eq!(detect(Some(" Application/PDF "), url), DocumentKind::Pdf);
    }

    #[test]
    fn header_wins_over_extension() {
        assert_eq!(
            detect(Some("text/plain"), "https://example.com/menu.pdf"),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn extension_fallback_when_header_missing_or_empty() {
        assert_eq!(detect(None, "https://example.com/a/menu.PDF"), DocumentKind::Pdf);
        assert_eq!(
            detect(Some(""), "https://example.com/menu.jpg?x=1"),
            DocumentKind::Image("image/jpeg".into())
        );
        assert_eq!(detect(None, "https://example.com/menu.docx"), DocumentKind::Word);
        assert_eq!(detect(None, "https://example.com/menu.txt"), DocumentKind::PlainText);
    }

    #[test]
    fn unknown_without_header_or_extension() {
        assert_eq!(
            detect(None, "https://example.com/download"),
            DocumentKind::Unsupported("unknown".into())
        );
        assert_eq!(
            detect(None, "https://example.com/archive.zip"),
            DocumentKind::Unsupported("unknown".into())
        );
    }

    #[test]
    fn octet_stream_is_unsupported() {
        assert_eq!(
            detect(Some("application/octet-stream"), "https://example.com/menu.pdf"),
            DocumentKind::Unsupported("application/octet-stream".into())
        );
    }
}
