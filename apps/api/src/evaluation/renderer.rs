//! Resume rendering — page 1 of the uploaded PDF as a model-ready image part.
//!
//! Only the first page is ever rendered. That is a scope limitation of the
//! product, not an oversight; multi-page support would be a capability change.

use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hayro::{render, Pdf, RenderSettings};
use hayro_interpret::InterpreterSettings;
use image::ImageOutputFormat;
use thiserror::Error;

use crate::llm_client::InlinePart;

pub const RESUME_MIME_TYPE: &str = "image/jpeg";

const RENDER_SCALE: f32 = 1.0;
const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    #[error("PDF has no pages")]
    EmptyDocument,

    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// Rasterizes page index 0 of `pdf_bytes`, encodes it as JPEG, and wraps the
/// base64 bytes with the MIME tag the evaluation client sends on the wire.
///
/// CPU-bound and synchronous — callers on the async runtime should run it
/// under `spawn_blocking`.
pub fn render_first_page(pdf_bytes: &[u8]) -> Result<InlinePart, RenderError> {
    let data = Arc::new(pdf_bytes.to_vec());
    let pdf = Pdf::new(data).map_err(|e| RenderError::Pdf(format!("{e:?}")))?;

    let pages = pdf.pages();
    let first_page = pages.iter().next().ok_or(RenderError::EmptyDocument)?;

    let interpreter_settings = InterpreterSettings::default();
    let render_settings = RenderSettings {
        x_scale: RENDER_SCALE,
        y_scale: RENDER_SCALE,
        ..Default::default()
    };

    let pixmap = render(first_page, &interpreter_settings, &render_settings);
    let png_data = pixmap.take_png();

    let jpeg_data = png_to_jpeg(&png_data)?;

    Ok(InlinePart {
        mime_type: RESUME_MIME_TYPE.to_string(),
        data: STANDARD.encode(jpeg_data),
    })
}

/// Re-encodes PNG bytes as JPEG. Alpha is dropped first — JPEG has no alpha
/// channel, and hayro renders onto a transparent canvas.
fn png_to_jpeg(png_data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let decoded =
        image::load_from_memory(png_data).map_err(|e| RenderError::Encode(e.to_string()))?;
    let opaque = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut jpeg_data = Vec::new();
    opaque
        .write_to(
            &mut Cursor::new(&mut jpeg_data),
            ImageOutputFormat::Jpeg(JPEG_QUALITY),
        )
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    Ok(jpeg_data)
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;

    use super::*;
    use crate::evaluation::fixtures::one_page_pdf;

    #[test]
    fn test_render_yields_jpeg_payload() {
        let payload = render_first_page(&one_page_pdf()).unwrap();

        assert_eq!(payload.mime_type, "image/jpeg");
        assert!(!payload.data.is_empty());

        // The base64 data must decode back to actual JPEG bytes (SOI marker).
        let jpeg = STANDARD.decode(&payload.data).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_render_rejects_non_pdf_bytes() {
        let err = render_first_page(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, RenderError::Pdf(_)));
    }

    #[test]
    fn test_render_rejects_empty_input() {
        let err = render_first_page(&[]).unwrap_err();
        assert!(matches!(err, RenderError::Pdf(_)));
    }
}
