//! PNG rendering of a code's public link.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

const MIN_SIZE: u32 = 256;

/// Encodes `text` as a QR symbol and returns the PNG bytes. Nothing touches
/// the filesystem.
pub fn render_png(text: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(text.as_bytes()).context("Failed to encode QR payload")?;
    let buffer = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_SIZE, MIN_SIZE)
        .build();

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(buffer)
        .write_to(&mut out, ImageFormat::Png)
        .context("Failed to encode PNG")?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_png_signature() {
        let bytes = render_png("http://127.0.0.1:5000/r/QR-001").unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.width() >= MIN_SIZE);
    }
}
