//! Conversion: turn a fetched document into model-ready content units.
//!
//! This is the single place that matches on [`DocumentKind`]; adding a new
//! supported type means adding a variant there and an arm here.

use crate::config::ServiceConfig;
use crate::error::{InvocationError, MenuError};
use crate::pipeline::detect::DocumentKind;
use crate::pipeline::{docx, encode, render};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One piece of content sent to the model in a single call.
#[derive(Debug, Clone)]
pub enum ContentUnit {
    /// A rendered PDF page or a downloaded image, PNG-encoded.
    Image(ImageData),
    /// Text extracted from a DOCX or decoded from a plain-text payload.
    Text(String),
}

/// Page-oriented details, present only for PDFs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfConversion {
    pub page_count: usize,
    /// Seconds spent rasterising (unrounded).
    pub conversion_secs: f64,
}

/// A unit ready for the model, or the reason it could not be prepared.
pub type PreparedUnit = Result<ContentUnit, InvocationError>;

/// The units of a converted document, in processing order.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub units: Vec<PreparedUnit>,
    pub pdf: Option<PdfConversion>,
}

impl ConvertedDocument {
    fn single(unit: ContentUnit) -> Self {
        Self {
            units: vec![Ok(unit)],
            pdf: None,
        }
    }
}

/// Convert `bytes` according to `kind`.
///
/// `Unsupported` fails before any conversion work is done.
pub async fn convert_document(
    kind: DocumentKind,
    bytes: Vec<u8>,
    config: &ServiceConfig,
) -> Result<ConvertedDocument, MenuError> {
    match kind {
        DocumentKind::Pdf => {
            info!("Converting PDF to images");
            let start = Instant::now();
            let pages = render::render_pdf(bytes, config).await?;
            let conversion_secs = start.elapsed().as_secs_f64();
            info!(
                "PDF converted to {} pages in {:.2}s",
                pages.len(),
                conversion_secs
            );

            let units = page_units(&pages, encode::encode_image);

            Ok(ConvertedDocument {
                pdf: Some(PdfConversion {
                    page_count: units.len(),
                    conversion_secs,
                }),
                units,
            })
        }
        DocumentKind::Image(media_type) => {
            info!("Processing image ({})", media_type);
            let img = encode::decode_image(&bytes)?;
            let data = encode::encode_image(&img).map_err(|e| MenuError::ImageDecodeFailed {
                detail: format!("re-encoding as PNG failed: {}", e),
            })?;
            Ok(ConvertedDocument::single(ContentUnit::Image(data)))
        }
        DocumentKind::Word => {
            info!("Processing DOCX document");
            let text = docx::extract_text(bytes, config.scratch_dir.clone()).await?;
            debug!("Extracted {} chars from DOCX", text.len());
            Ok(ConvertedDocument::single(ContentUnit::Text(text)))
        }
        DocumentKind::PlainText => {
            info!("Processing plain-text document");
            let text = String::from_utf8(bytes).map_err(|e| MenuError::TextDecodeFailed {
                detail: e.to_string(),
            })?;
            Ok(ConvertedDocument::single(ContentUnit::Text(text)))
        }
        DocumentKind::Unsupported(media_type) => Err(MenuError::UnsupportedMedia { media_type }),
    }
}

/// Encode rendered pages one by one. A page that fails to encode becomes a
/// failed unit; the other pages are unaffected.
fn page_units<E, F>(pages: &[DynamicImage], encode: F) -> Vec<PreparedUnit>
where
    E: std::fmt::Display,
    F: Fn(&DynamicImage) -> Result<ImageData, E>,
{
    pages
        .iter()
        .enumerate()
        .map(|(idx, img)| {
            encode(img).map(ContentUnit::Image).map_err(|e| {
                warn!("Page {} could not be encoded: {}", idx + 1, e);
                InvocationError::PageUnreadable {
                    unit: idx + 1,
                    detail: e.to_string(),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 200, 30])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn image_becomes_one_png_unit() {
        let doc = convert_document(
            DocumentKind::Image("image/jpeg".into()),
            jpeg_bytes(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(doc.units.len(), 1);
        assert!(doc.pdf.is_none());
        match &doc.units[0] {
            Ok(ContentUnit::Image(data)) => assert_eq!(data.mime_type, "image/png"),
            other => panic!("expected image unit, got {other:?}"),
        }
    }

    #[test]
    fn unencodable_page_is_isolated() {
        let page = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let pages = vec![page.clone(), page.clone(), page];
        let calls = std::cell::Cell::new(0);

        let units = page_units(&pages, |img| {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                Err("encoder refused the page")
            } else {
                encode::encode_image(img).map_err(|_| "unexpected")
            }
        });

        assert_eq!(units.len(), 3);
        assert!(matches!(units[0], Ok(ContentUnit::Image(_))));
        assert!(matches!(
            units[1],
            Err(InvocationError::PageUnreadable { unit: 2, .. })
        ));
        assert!(matches!(units[2], Ok(ContentUnit::Image(_))));
    }

    #[tokio::test]
    async fn corrupt_image_is_conversion_error() {
        let err = convert_document(
            DocumentKind::Image("image/png".into()),
            b"not a png".to_vec(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conversion);
    }

    #[tokio::test]
    async fn text_becomes_one_text_unit() {
        let doc = convert_document(
            DocumentKind::PlainText,
            "Sopa del día: 5€".as_bytes().to_vec(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap();
        match &doc.units[..] {
            [Ok(ContentUnit::Text(t))] => assert_eq!(t, "Sopa del día: 5€"),
            other => panic!("unexpected units {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_is_text_decode_error() {
        let err = convert_document(
            DocumentKind::PlainText,
            vec![0xff, 0xfe, 0x00, 0xc3],
            &ServiceConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MenuError::TextDecodeFailed { .. }));
    }

    #[tokio::test]
    async fn unsupported_fails_without_converting() {
        let err = convert_document(
            DocumentKind::Unsupported("application/zip".into()),
            vec![1, 2, 3],
            &ServiceConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            MenuError::UnsupportedMedia { ref media_type } if media_type == "application/zip"
        ));
    }
}
