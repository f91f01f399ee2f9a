use anyhow::{Result, anyhow};
use image::{GrayImage, Luma, imageops};
use qrcode::{EcLevel, QrCode};

const LIGHT: Luma<u8> = Luma([255]);

pub fn encode_matrix(data: &str, ec_level: EcLevel) -> Result<QrCode> {
    QrCode::with_error_correction_level(data.as_bytes(), ec_level)
        .map_err(|err| anyhow!("encode qr code failed: {err}"))
}

/// Side of the rendered image for a symbol of `modules` cells.
pub fn raster_side(modules: u32, box_size: u32, border: u32) -> Option<u32> {
    modules
        .checked_add(border.checked_mul(2)?)?
        .checked_mul(box_size)
}

/// Renders every module as a `box_size` square, surrounded by `border`
/// light modules of quiet zone.
pub fn rasterize(code: &QrCode, box_size: u32, border: u32) -> Result<GrayImage> {
    let modules = code.width() as u32;
    let side = raster_side(modules, box_size, border).ok_or_else(|| {
        anyhow!("qr code image side overflows: {modules} modules, box_size {box_size}, border {border}")
    })?;

    // The renderer's own quiet zone is a fixed four modules.
    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(box_size, box_size)
        .build();

    let mut image = GrayImage::from_pixel(side, side, LIGHT);
    let offset = (border * box_size) as i64;
    imageops::replace(&mut image, &symbol, offset, offset);
    Ok(image)
}
