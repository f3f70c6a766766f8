//! Pipeline stages for menu extraction.
//!
//! Each submodule implements exactly one step, so every stage can be tested
//! on its own and the orchestration in [`crate::extract`] reads as a list of
//! calls.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ detect ──▶ units ──▶ llm ──▶ sanitize ──▶ aggregate
//! (fetch)   (media)   (render/    (model)  (fences,    (items +
//!                      encode/             JSON)       timings)
//!                      docx)
//! ```
//!
//! 1. [`input`]: download the document with the caller's timeout
//! 2. [`detect`]: map `Content-Type` (or the URL extension) to a
//!    [`detect::DocumentKind`]
//! 3. [`units`]: convert into [`units::ContentUnit`]s via [`render`],
//!    [`encode`] and [`docx`]
//! 4. [`llm`]: one model call per unit, no retries
//! 5. [`sanitize`]: strip code fences and parse the reply as a JSON array
//! 6. [`aggregate`]: concatenate items, time each unit

pub mod aggregate;
pub mod detect;
pub mod docx;
pub mod encode;
pub mod input;
pub mod llm;
pub mod render;
pub mod sanitize;
pub mod units;
