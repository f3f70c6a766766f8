//! PDF rasterisation: render every page of an in-memory PDF via pdfium.
//!
//! pdfium is a blocking C++ library with thread-local state, so all work runs
//! inside `spawn_blocking`. Pages are scaled by `dpi / 72` and the longest
//! edge is capped at `max_rendered_pixels` to keep memory bounded on poster
//! sized menus.

use crate::config::ServiceConfig;
use crate::error::MenuError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// PDF user units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Rasterise all pages of `bytes`, in page order.
pub async fn render_pdf(
    bytes: Vec<u8>,
    config: &ServiceConfig,
) -> Result<Vec<DynamicImage>, MenuError> {
    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let lib_path = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        render_pdf_blocking(&bytes, dpi, max_pixels, lib_path.as_deref())
    })
    .await
    .map_err(|e| MenuError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind to libpdfium: an explicit directory first, else the system library.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, MenuError> {
    let bindings = match lib_path {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
            .or_else(|_| Pdfium::bind_to_system_library()),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| {
        MenuError::Internal(format!(
            "Failed to bind to pdfium library: {:?}. Set PDFIUM_LIB_PATH to the directory containing libpdfium.",
            e
        ))
    })?;

    Ok(Pdfium::new(bindings))
}

fn render_pdf_blocking(
    bytes: &[u8],
    dpi: u32,
    max_pixels: u32,
    lib_path: Option<&Path>,
) -> Result<Vec<DynamicImage>, MenuError> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| MenuError::CorruptPdf {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / POINTS_PER_INCH)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            MenuError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}
