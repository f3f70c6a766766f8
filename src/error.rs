//! Error types for the menu-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MenuError`]: **Fatal.** The request cannot proceed at all (the URL
//!   could not be fetched, the media type is unsupported, the document could
//!   not be converted). Returned as `Err(MenuError)` from the `process_*`
//!   entry points and mapped to an HTTP status by the server layer.
//!
//! * [`InvocationError`]: **Non-fatal.** A single unit (one page, one
//!   image, one text blob) could not be encoded or its model call failed. It is logged and the unit
//!   contributes zero items; the remaining units are still processed.

use thiserror::Error;

/// Coarse grouping of [`MenuError`] variants, one per failure stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetching the document failed (bad URL, network, non-2xx, timeout).
    Download,
    /// The document's media type is not one we can convert.
    UnsupportedMedia,
    /// The document was fetched but could not be turned into model units.
    Conversion,
    /// Anything else: configuration, provider set-up, runtime failures.
    Internal,
}

/// All fatal errors returned by the menu-extract library.
///
/// Per-unit model failures use [`InvocationError`] and never surface here.
#[derive(Debug, Error)]
pub enum MenuError {
    // ── Download errors ───────────────────────────────────────────────────
    /// The input string is not a valid HTTP/HTTPS URL.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// The URL was valid but the download failed or returned a non-2xx status.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the caller's timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Dispatch errors ───────────────────────────────────────────────────
    /// The declared or guessed media type is not supported.
    #[error("Unsupported file type: {media_type}")]
    UnsupportedMedia { media_type: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt or unreadable: {detail}")]
    CorruptPdf { detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The payload claimed to be an image but could not be decoded.
    #[error("Failed to decode image: {detail}")]
    ImageDecodeFailed { detail: String },

    /// Text could not be extracted from a word-processing document.
    #[error("Failed to extract text from DOCX: {detail}")]
    DocumentExtractionFailed { detail: String },

    /// A plain-text payload was not valid UTF-8.
    #[error("Failed to decode text as UTF-8: {detail}")]
    TextDecodeFailed { detail: String },

    // ── Set-up errors ─────────────────────────────────────────────────────
    /// The configured provider could not be created (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MenuError {
    /// The failure stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MenuError::InvalidUrl { .. }
            | MenuError::DownloadFailed { .. }
            | MenuError::DownloadTimeout { .. } => ErrorKind::Download,
            MenuError::UnsupportedMedia { .. } => ErrorKind::UnsupportedMedia,
            MenuError::CorruptPdf { .. }
            | MenuError::RasterisationFailed { .. }
            | MenuError::ImageDecodeFailed { .. }
            | MenuError::DocumentExtractionFailed { .. }
            | MenuError::TextDecodeFailed { .. } => ErrorKind::Conversion,
            MenuError::ProviderNotConfigured { .. }
            | MenuError::InvalidConfig(_)
            | MenuError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A non-fatal failure for a single unit.
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    /// A rendered page could not be prepared for the model.
    #[error("Unit {unit}: page could not be encoded: {detail}")]
    PageUnreadable { unit: usize, detail: String },

    /// The provider returned an error (network, auth, quota, bad request…).
    #[error("Unit {unit}: model call failed: {detail}")]
    ModelFailed { unit: usize, detail: String },

    /// The provider answered but produced no text at all.
    #[error("Unit {unit}: model returned an empty reply")]
    EmptyReply { unit: usize },
}
