//! QR symbol generation.
//!
//! The encoder itself is the `qrcode` crate; this module only turns its
//! module grid into a bitmap and scales that bitmap to the label's QR size.

use image::{DynamicImage, GrayImage, Luma, RgbImage, imageops::FilterType};
use qrcode::{Color, QrCode};

use crate::error::LabelError;

/// Pixels per QR module before scaling.
pub const MODULE_PIXELS: u32 = 10;

/// Quiet zone width in modules on every side.
pub const QUIET_ZONE: u32 = 4;

/// Encode `data` as a black-on-white bitmap including the quiet zone.
///
/// The bitmap size depends on the symbol version the encoder picks.
pub fn encode(data: &str) -> Result<GrayImage, LabelError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| LabelError::QrCode(format!("QR code generation failed: {}", e)))?;

    let modules = code.width() as u32;
    let side = (modules + 2 * QUIET_ZONE) * MODULE_PIXELS;
    let mut img = GrayImage::from_pixel(side, side, Luma([255]));

    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != Color::Dark {
                continue;
            }
            let px = (qx + QUIET_ZONE) * MODULE_PIXELS;
            let py = (qy + QUIET_ZONE) * MODULE_PIXELS;
            for dy in 0..MODULE_PIXELS {
                for dx in 0..MODULE_PIXELS {
                    img.put_pixel(px + dx, py + dy, Luma([0]));
                }
            }
        }
    }

    Ok(img)
}

/// Encode `data` and scale the symbol to `size × size` RGB pixels with a
/// Lanczos filter.
pub fn qr_bitmap(data: &str, size: u32) -> Result<RgbImage, LabelError> {
    let symbol = encode(data)?;
    let rgb = DynamicImage::ImageLuma8(symbol).to_rgb8();
    let resized = DynamicImage::ImageRgb8(rgb).resize_exact(size, size, FilterType::Lanczos3);
    Ok(resized.to_rgb8())
}
