//! # menu-extract
//!
//! Extract structured restaurant-menu items from documents on the web using
//! a multimodal generative model.
//!
//! A caller hands over a URL. The service downloads the document, works out
//! what it is, turns it into units the model can read (one PNG per PDF page,
//! one image, or one block of text) and asks the model, unit by unit, to list
//! every dish it sees as JSON. Replies are sanitized, concatenated and
//! returned together with timing metrics.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Input      download with a per-request timeout
//!  ├─ 2. Detect     Content-Type (or URL extension) → DocumentKind
//!  ├─ 3. Convert    PDF pages via pdfium │ image → PNG │ DOCX/text → text
//!  ├─ 4. Model      one call per unit, sequential, failures isolated
//!  ├─ 5. Sanitize   strip code fences, parse JSON array
//!  └─ 6. Aggregate  items in unit order + p1..pN timings
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use menu_extract::{MenuExtractor, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY, DEVELOPMENT, MENU_MODEL, PDFIUM_LIB_PATH …
//!     let config = ServiceConfig::from_env()?;
//!     let extractor = MenuExtractor::new(config)?;
//!     let result = extractor
//!         .process_url("https://example.com/menu.pdf", Some(30))
//!         .await?;
//!     println!("{} dishes", result.metrics().total_platillos);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | The axum router in [`server`] and the `menu-server` binary |
//!
//! Disable `server` to embed only the extraction library:
//! ```toml
//! menu-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{ErrorKind, InvocationError, MenuError};
pub use extract::MenuExtractor;
pub use output::{ExtractionData, MenuItem, Metrics, PageTimings, ProcessingResult};
pub use pipeline::detect::DocumentKind;
pub use pipeline::llm::{ContentModel, LlmContentModel};
pub use pipeline::units::ContentUnit;
pub use prompts::EXTRACTION_PROMPT;
