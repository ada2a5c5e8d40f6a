//! Decoding of images referenced from documents.
//!
//! Runs on the I/O thread; the UI thread only uploads the finished pixels.
//! Oversized images are rejected before their pixels are decoded.

use eframe::egui::ColorImage;
use log::warn;
use std::io::Cursor;
use std::path::Path;

const MAX_IMAGE_SIDE: u32 = 8192;
const MAX_IMAGE_PIXELS: u64 = 32 * 1024 * 1024;
const MAX_IMAGE_BYTES: usize = 64 * 1024 * 1024;

fn exceeds_limits(width: u32, height: u32) -> bool {
    width == 0
        || height == 0
        || width > MAX_IMAGE_SIDE
        || height > MAX_IMAGE_SIDE
        || (width as u64).saturating_mul(height as u64) > MAX_IMAGE_PIXELS
}

/// Decode image bytes into an egui image.
///
/// Returns `None` if the bytes are not a supported format or the image is
/// too large to display.
pub fn decode_image(data: &[u8]) -> Option<ColorImage> {
    if data.len() > MAX_IMAGE_BYTES {
        return None;
    }
    // Reads only the header
    let dimensions = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());
    if let Some((width, height)) = dimensions {
        if exceeds_limits(width, height) {
            return None;
        }
    }

    let rgba = image::load_from_memory(data).ok()?.to_rgba8();
    let (width, height) = rgba.dimensions();
    if exceeds_limits(width, height) {
        return None;
    }
    Some(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        rgba.as_raw(),
    ))
}

/// Read and decode an image file.
pub fn load_image_file(path: &Path) -> Option<ColorImage> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to read image {}: {}", path.display(), e);
            return None;
        }
    };
    let image = decode_image(&data);
    if image.is_none() {
        warn!("Unsupported or oversized image: {}", path.display());
    }
    image
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = image::RgbaImage::new(width, height);
    buffer.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(buffer)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
