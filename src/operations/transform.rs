//! Geometric operations: pixelating resize, and the letterbox fit used for display.

use crate::core::buffer::PixelBuffer;
use crate::core::error::BufferError;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Shrink to `percent`% of the width (aspect kept), then blow back up with
/// nearest-neighbour sampling so the result is blocky.
pub(crate) fn resize(buffer: &mut PixelBuffer, percent: i64) -> Result<(), BufferError> {
    let (width, height) = buffer.dimensions();
    let (small_width, small_height) = shrunk_size(width, height, percent);
    if (small_width, small_height) == (width, height) {
        return Ok(());
    }

    let small = imageops::resize(buffer.as_image(), small_width, small_height, FilterType::Nearest);
    let restored = imageops::resize(&small, width, height, FilterType::Nearest);
    buffer.replace_image(restored)
}

/// Size of the intermediate image for a `-resize percent` step.
pub fn shrunk_size(width: u32, height: u32, percent: i64) -> (u32, u32) {
    let percent = percent.clamp(1, 100) as u64;
    let small_width = ((width as u64 * percent) / 100).max(1);
    let small_height = ((small_width * height as u64) / width as u64).max(1);
    (small_width as u32, small_height as u32)
}

/// Placement of a letterboxed frame inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterboxRect {
    /// X offset of the scaled frame.
    pub x: u32,
    /// Y offset of the scaled frame.
    pub y: u32,
    /// Width of the scaled frame.
    pub width: u32,
    /// Height of the scaled frame.
    pub height: u32,
}

impl LetterboxRect {
    /// Fit `source` into `viewport` preserving aspect ratio, centred on the
    /// axis with spare room.
    pub fn fit(source: (u32, u32), viewport: (u32, u32)) -> Self {
        let (sw, sh) = (source.0.max(1) as f64, source.1.max(1) as f64);
        let (vw, vh) = (viewport.0, viewport.1);
        let scale = (vw as f64 / sw).min(vh as f64 / sh);
        let width = ((sw * scale).round() as u32).clamp(1, vw.max(1));
        let height = ((sh * scale).round() as u32).clamp(1, vh.max(1));
        Self {
            x: vw.saturating_sub(width) / 2,
            y: vh.saturating_sub(height) / 2,
            width,
            height,
        }
    }
}

/// Scale `frame` into a fresh `viewport`-sized buffer filled with `background`.
pub fn letterbox(
    frame: &PixelBuffer,
    viewport: (u32, u32),
    background: [u8; 4],
) -> Result<PixelBuffer, BufferError> {
    let rect = LetterboxRect::fit(frame.dimensions(), viewport);
    let mut canvas = RgbaImage::from_pixel(viewport.0, viewport.1, Rgba(background));
    if viewport.0 == 0 || viewport.1 == 0 {
        return PixelBuffer::from_image(canvas);
    }

    let scaled = if (rect.width, rect.height) == frame.dimensions() {
        frame.as_image().clone()
    } else {
        imageops::resize(frame.as_image(), rect.width, rect.height, FilterType::Triangle)
    };
    imageops::replace(&mut canvas, &scaled, rect.x as i64, rect.y as i64);
    PixelBuffer::from_image(canvas)
}
