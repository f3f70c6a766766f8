//! Image encoding: `DynamicImage` → base64 PNG wrapped in `ImageData`.
//!
//! Rendered PDF pages and downloaded images both go through here, so the
//! model always receives a lossless PNG regardless of the source format.
//! `detail: "high"` asks OpenAI-style providers for full-resolution tiling.

use crate::error::MenuError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode an image as a base64 PNG ready for the model API.
pub fn encode_image(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

/// Decode a downloaded image payload, guessing the format from its bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, MenuError> {
    image::load_from_memory(bytes).map_err(|e| MenuError::ImageDecodeFailed {
        detail: e.to_string(),
    })
}
