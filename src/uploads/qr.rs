use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use toolcrib_common::{Error, Result};

/// Smallest edge of the rendered QR image, in pixels.
const MIN_QR_SIZE: u32 = 240;

/// Encode `content` as a QR code and return it as PNG bytes.
pub fn render_qr_png(content: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(content.as_bytes())
        .map_err(|e| Error::invalid_input(format!("cannot encode QR code: {}", e)))?;

    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_QR_SIZE, MIN_QR_SIZE)
        .build();

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::internal(format!("failed to encode QR PNG: {}", e)))?;

    Ok(buf.into_inner())
}
