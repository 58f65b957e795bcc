//! RGBA pixel buffer that every operation reads and writes.
//!
//! A [`PixelBuffer`] is a thin owner around an [`RgbaImage`] that guarantees
//! non-zero dimensions. Channels are `u8`, so the [0, 255] clamp invariant is
//! carried by the type; operations are responsible for clamping *before*
//! narrowing their intermediate math back to bytes.

use crate::core::error::BufferError;
use image::{DynamicImage, Rgba, RgbaImage};
use std::fmt;

/// Number of bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Addressable RGBA raster with non-zero width and height.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Allocate a zeroed (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Allocate a buffer filled with a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        })
    }

    /// Wrap raw RGBA bytes. `pixels.len()` must equal `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * CHANNELS;
        let got = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .map(|image| Self { image })
            .ok_or(BufferError::LengthMismatch { expected, got })
    }

    /// Take ownership of an already decoded RGBA image.
    pub fn from_image(image: RgbaImage) -> Result<Self, BufferError> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self { image })
    }

    /// Convert any decoded image into an RGBA buffer.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self, BufferError> {
        Self::from_image(image.to_rgba8())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Read one pixel, bounds checked.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<[u8; 4], BufferError> {
        self.check_bounds(x, y)?;
        Ok(self.image.get_pixel(x, y).0)
    }

    /// Write one pixel, bounds checked.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<(), BufferError> {
        self.check_bounds(x, y)?;
        self.image.put_pixel(x, y, Rgba(rgba));
        Ok(())
    }

    /// Full channel array, row-major RGBA.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Mutable full channel array, row-major RGBA.
    #[inline]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// Overwrite every channel from `pixels`, which must match the current size.
    pub fn write_raw(&mut self, pixels: &[u8]) -> Result<(), BufferError> {
        let expected = self.image.len();
        if pixels.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                got: pixels.len(),
            });
        }
        self.as_raw_mut().copy_from_slice(pixels);
        Ok(())
    }

    /// Borrow as an `image` crate buffer for resampling and encoding.
    #[inline]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Replace the contents with an image of the same dimensions.
    pub(crate) fn replace_image(&mut self, image: RgbaImage) -> Result<(), BufferError> {
        if image.dimensions() != self.image.dimensions() {
            return Err(BufferError::LengthMismatch {
                expected: self.image.len(),
                got: image.len(),
            });
        }
        self.image = image;
        Ok(())
    }

    /// Give back the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Fill every pixel with one colour.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for pixel in self.as_raw_mut().chunks_exact_mut(CHANNELS) {
            pixel.copy_from_slice(&rgba);
        }
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), BufferError> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(BufferError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), BufferError> {
    if width == 0 || height == 0 {
        Err(BufferError::ZeroDimension { width, height })
    } else {
        Ok(())
    }
}
