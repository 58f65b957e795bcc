//! Image ingestion and export.
//!
//! Ingested images are converted to RGBA and fitted so their width does not
//! exceed a maximum. Export is JPEG: to bytes, to a file, or to a data URL.

use crate::core::buffer::PixelBuffer;
use crate::core::error::{CookError, CookResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageResult};
use std::io::Write;
use std::path::Path;

/// Size after fitting `width x height` to at most `max_width` wide.
pub fn fitted_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let height = (height as u64 * max_width as u64 + width as u64 / 2) / width as u64;
    (max_width, (height as u32).max(1))
}

/// Convert and fit a decoded image.
pub fn ingest(image: &DynamicImage, max_width: u32) -> CookResult<PixelBuffer> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let (fit_width, fit_height) = fitted_size(width, height, max_width);
    let rgba = if (fit_width, fit_height) == (width, height) {
        rgba
    } else {
        log::debug!("Fitting {width}x{height} input to {fit_width}x{fit_height}");
        imageops::resize(&rgba, fit_width, fit_height, FilterType::Triangle)
    };
    Ok(PixelBuffer::from_image(rgba)?)
}

/// Decode any supported format from memory.
pub fn decode(bytes: &[u8], max_width: u32) -> CookResult<PixelBuffer> {
    let image = image::load_from_memory(bytes)?;
    ingest(&image, max_width)
}

/// Load an image file.
pub fn load_image(path: impl AsRef<Path>, max_width: u32) -> CookResult<PixelBuffer> {
    let path = path.as_ref();
    let image = image::open(path)?;
    log::info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
    ingest(&image, max_width)
}

/// Encode as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> ImageResult<Vec<u8>> {
    let mut output = Vec::new();
    write_jpeg(buffer, quality, &mut output)?;
    Ok(output)
}

fn write_jpeg<W: Write>(buffer: &PixelBuffer, quality: u8, writer: W) -> ImageResult<()> {
    let rgb = DynamicImage::ImageRgba8(buffer.as_image().clone()).to_rgb8();
    let mut encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
    encoder.encode(&rgb, rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
}

/// Write a JPEG file, creating parent directories as needed.
pub fn export_jpeg(buffer: &PixelBuffer, path: impl AsRef<Path>, quality: u8) -> CookResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(path)?;
    let mut output = std::io::BufWriter::new(file);
    write_jpeg(buffer, quality, &mut output)?;
    output.flush().map_err(CookError::Io)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// `data:image/jpeg;base64,...` for embedding.
pub fn to_data_url(buffer: &PixelBuffer, quality: u8) -> CookResult<String> {
    let bytes = encode_jpeg(buffer, quality)?;
    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(bytes)))
}
