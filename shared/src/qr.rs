//! QR code images for plant labels
//!
//! Codes are rendered locally at error-correction level H, black on white.
//! The external image endpoint is kept as a fallback for when local
//! rendering fails.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{types::QrError, EcLevel, QrCode};
use thiserror::Error;
use url::form_urlencoded;

/// Default external QR image generation endpoint
pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Edge length in pixels of generated QR images
pub const DEFAULT_QR_SIZE: u32 = 512;

#[derive(Error, Debug)]
pub enum QrRenderError {
    #[error("Code cannot be encoded as a QR symbol: {0}")]
    Encode(#[from] QrError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// File name of the downloaded QR image
pub fn qr_download_filename(code: &str) -> String {
    format!("QR_{}.png", code)
}

/// Query parameters understood by the external endpoint, black on white
pub fn qr_image_params(code: &str, size: u32) -> [(&'static str, String); 4] {
    [
        ("size", format!("{}x{}", size, size)),
        ("data", code.to_string()),
        ("color", "000000".to_string()),
        ("bgcolor", "ffffff".to_string()),
    ]
}

/// Full URL of the external endpoint rendering `code`
pub fn qr_image_url(endpoint: &str, code: &str, size: u32) -> String {
    let query = qr_image_params(code, size)
        .iter()
        .map(|(key, value)| {
            let value: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
            format!("{}={}", key, value)
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", endpoint, query)
}

/// Render `code` as a PNG at least `size` pixels wide, including the quiet zone
pub fn render_qr_png(code: &str, size: u32) -> Result<Vec<u8>, QrRenderError> {
    let symbol = QrCode::with_error_correction_level(code.as_bytes(), EcLevel::H)?;
    let pixels = symbol
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .dark_color(Luma([0]))
        .light_color(Luma([255]))
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(pixels).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
