use anyhow::{Result, anyhow};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops, imageops::FilterType};

use crate::params::LogoOptions;

/// Logo slot side as a share of the symbol side (quiet zone excluded).
pub const LOGO_RATIO: f32 = 0.25;

const BACKDROP: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn decode_image(bytes: &[u8], mime_type: &str) -> Result<DynamicImage> {
    let format = mime_to_format(mime_type)?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|err| anyhow!("decode image failed: {err}"))
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|err| anyhow!("encode png failed: {err}"))?;
    Ok(output)
}

pub fn detect_mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    None
}

pub fn mime_to_format(mime_type: &str) -> Result<ImageFormat> {
    match mime_type {
        "image/png" => Ok(ImageFormat::Png),
        "image/jpeg" | "image/jpg" => Ok(ImageFormat::Jpeg),
        "image/gif" => Ok(ImageFormat::Gif),
        "image/webp" => Ok(ImageFormat::WebP),
        "image/bmp" => Ok(ImageFormat::Bmp),
        _ => Err(anyhow!("unsupported image type: {mime_type}")),
    }
}

/// Clears every pixel outside a rounded rectangle. `round` is a percentage
/// of half the shorter side: 0 keeps the square, 100 yields a circle.
pub fn round_corners(image: &mut RgbaImage, round: u32) {
    let (width, height) = image.dimensions();
    let radius = round.min(100) as f32 / 100.0 * width.min(height) as f32 / 2.0;
    if radius <= 0.0 {
        return;
    }
    let (w, h) = (width as f32, height as f32);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        let cx = px.clamp(radius, w - radius);
        let cy = py.clamp(radius, h - radius);
        let (dx, dy) = (px - cx, py - cy);
        if dx * dx + dy * dy > radius * radius {
            pixel.0[3] = 0;
        }
    }
}

pub fn logo_slot_side(symbol_side: u32) -> u32 {
    ((symbol_side as f32 * LOGO_RATIO).round() as u32).max(1)
}

/// Places `logo` on a rounded white backdrop at the center of `qr`.
/// `symbol_side` is the pixel side of the module area without quiet zone.
pub fn overlay_logo(
    qr: &mut RgbaImage,
    logo: &DynamicImage,
    symbol_side: u32,
    options: &LogoOptions,
) {
    let slot = logo_slot_side(symbol_side);
    let padding = options.padding.min(slot.saturating_sub(1) / 2);
    let inner = slot - 2 * padding;

    let mut resized = logo.resize(inner, inner, FilterType::Lanczos3).to_rgba8();
    round_corners(&mut resized, options.round);

    let mut backdrop = RgbaImage::from_pixel(slot, slot, BACKDROP);
    let (logo_width, logo_height) = resized.dimensions();
    imageops::overlay(
        &mut backdrop,
        &resized,
        ((slot - logo_width) / 2) as i64,
        ((slot - logo_height) / 2) as i64,
    );
    round_corners(&mut backdrop, options.round);

    let (width, height) = qr.dimensions();
    imageops::overlay(
        qr,
        &backdrop,
        (width.saturating_sub(slot) / 2) as i64,
        (height.saturating_sub(slot) / 2) as i64,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{encode_matrix, rasterize};
    use qrcode::EcLevel;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn red_logo() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, RED))
    }

    fn is_red(pixel: &Rgba<u8>) -> bool {
        pixel.0[0] > 200 && pixel.0[1] < 50 && pixel.0[2] < 50
    }

    fn options(round: u32, padding: u32) -> LogoOptions {
        LogoOptions {
            url: "https://example.com/logo.png".to_string(),
            round,
            padding,
        }
    }

    #[test]
    fn sniffs_common_formats() {
        let png = encode_png(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, RED))).unwrap();
        assert_eq!(detect_mime_type(&png), Some("image/png"));
        assert_eq!(detect_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_mime_type(b"GIF89a...."), Some("image/gif"));
        assert_eq!(detect_mime_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_mime_type(b"<html>"), None);
    }

    #[test]
    fn decode_rejects_unknown_mime() {
        let err = decode_image(b"whatever", "text/html").unwrap_err();
        assert!(err.to_string().contains("unsupported image type"));
    }

    #[test]
    fn png_decodes_back_to_same_pixels() {
        let png = encode_png(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, RED))).unwrap();
        let decoded = decode_image(&png, "image/png").unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(*decoded.get_pixel(2, 1), RED);
    }

    #[test]
    fn full_round_clears_corners_only() {
        let mut image = RgbaImage::from_pixel(100, 100, RED);
        round_corners(&mut image, 100);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(99, 99).0[3], 0);
        assert_eq!(image.get_pixel(50, 0).0[3], 255);
        assert_eq!(image.get_pixel(50, 50).0[3], 255);
    }

    #[test]
    fn zero_round_keeps_square() {
        let mut image = RgbaImage::from_pixel(10, 10, RED);
        round_corners(&mut image, 0);
        assert!(image.pixels().all(|pixel| pixel.0[3] == 255));
    }

    #[test]
    fn circular_logo_without_inset() {
        let code = encode_matrix("hello", EcLevel::H).unwrap();
        let symbol_side = code.width() as u32 * 20;
        let mut qr = DynamicImage::ImageLuma8(rasterize(&code, 20, 3).unwrap()).to_rgba8();
        let original = qr.clone();
        overlay_logo(&mut qr, &red_logo(), symbol_side, &options(100, 0));

        let slot = logo_slot_side(symbol_side);
        let origin = (qr.width() - slot) / 2;
        let center = origin + slot / 2;
        assert!(is_red(qr.get_pixel(center, center)));
        // The circle touches the slot edges.
        assert!(is_red(qr.get_pixel(center, origin)));
        assert!(is_red(qr.get_pixel(origin, center)));
        // Slot corners are outside the circle and keep the modules.
        assert_eq!(qr.get_pixel(origin, origin), original.get_pixel(origin, origin));
        let far = origin + slot - 1;
        assert_eq!(qr.get_pixel(far, far), original.get_pixel(far, far));
    }

    #[test]
    fn square_logo_with_padding_has_white_margin() {
        let code = encode_matrix("hello", EcLevel::H).unwrap();
        let symbol_side = code.width() as u32 * 20;
        let mut qr = DynamicImage::ImageLuma8(rasterize(&code, 20, 3).unwrap()).to_rgba8();
        overlay_logo(&mut qr, &red_logo(), symbol_side, &options(0, 10));

        let slot = logo_slot_side(symbol_side);
        let origin = (qr.width() - slot) / 2;
        let center = origin + slot / 2;
        assert_eq!(*qr.get_pixel(origin, origin), BACKDROP);
        assert_eq!(*qr.get_pixel(origin + 5, center), BACKDROP);
        assert!(is_red(qr.get_pixel(center, center)));
        assert!(is_red(qr.get_pixel(origin + 12, origin + 12)));
    }

    #[test]
    fn oversized_padding_still_leaves_a_logo() {
        let mut qr = RgbaImage::from_pixel(40, 40, BACKDROP);
        overlay_logo(&mut qr, &red_logo(), 40, &options(0, 100));
        // slot 10px, padding clamped to 4, leaving a 2px logo at 19..21.
        assert!(is_red(qr.get_pixel(20, 20)));
        assert_eq!(*qr.get_pixel(16, 16), BACKDROP);
    }
}
