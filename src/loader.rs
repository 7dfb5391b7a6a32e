//! Image decoding for photos, image stickers and background images.
//!
//! Everything the `image` crate reads is supported. HEIC/HEIF photos, as
//! shot by phones, decode through libheif when the `heif` feature is on.

use crate::error::FrameError;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Decode the image at `path` into RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, FrameError> {
    let bytes = std::fs::read(path)
        .map_err(|e| FrameError::AssetLoad(format!("{}: {}", path.display(), e)))?;
    decode_image(&bytes, &path.to_string_lossy()).map(|img| img.to_rgba8())
}

/// Decode in-memory image data. `name` only picks the HEIC path by
/// extension and labels errors.
pub fn decode_image(bytes: &[u8], name: &str) -> Result<DynamicImage, FrameError> {
    let lower = name.to_lowercase();
    if is_heic(bytes) || lower.ends_with(".heic") || lower.ends_with(".heif") {
        return decode_heic(bytes).map_err(|e| FrameError::AssetLoad(format!("{}: {}", name, e)));
    }
    image::load_from_memory(bytes).map_err(|e| FrameError::AssetLoad(format!("{}: {}", name, e)))
}

/// HEIF containers carry an `ftyp` box with a HEIC-family brand.
pub fn is_heic(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }
    matches!(
        &data[8..12],
        b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" | b"hevm" | b"hevs" | b"mif1" | b"msf1"
    )
}

#[cfg(feature = "heif")]
fn decode_heic(data: &[u8]) -> Result<DynamicImage, String> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(|e| format!("failed to read HEIC: {}", e))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| format!("failed to get primary image: {}", e))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| format!("failed to decode HEIC image: {}", e))?;

    let planes = decoded.planes();
    let interleaved = planes.interleaved.ok_or("no interleaved RGBA data in HEIC")?;
    let (width, height) = (decoded.width(), decoded.height());
    let row = width as usize * 4;

    let mut pixels = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * interleaved.stride;
        let line = interleaved
            .data
            .get(start..start + row)
            .ok_or("truncated HEIC plane")?;
        pixels.extend_from_slice(line);
    }
    RgbaImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| "HEIC plane size mismatch".to_string())
}

#[cfg(not(feature = "heif"))]
fn decode_heic(_data: &[u8]) -> Result<DynamicImage, String> {
    Err("HEIC support not compiled in (enable the `heif` feature)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_heic_brands() {
        let mut data = vec![0, 0, 0, 24];
        data.extend_from_slice(b"ftypheic");
        assert!(is_heic(&data));
        data[8..12].copy_from_slice(b"isom");
        assert!(!is_heic(&data));
        assert!(!is_heic(b"short"));
    }

    #[test]
    fn test_decode_png_roundtrip() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let decoded = decode_image(buf.get_ref(), "photo.png").unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1), &image::Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_garbage_is_asset_error() {
        let err = decode_image(b"not an image at all", "x.png").unwrap_err();
        assert!(matches!(err, FrameError::AssetLoad(_)));
    }

    #[test]
    fn test_missing_file_is_asset_error() {
        let err = load_image(Path::new("/nonexistent/photo.jpg")).unwrap_err();
        assert!(matches!(err, FrameError::AssetLoad(_)));
    }
}
