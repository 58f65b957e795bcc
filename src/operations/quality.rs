//! Lossy re-encode round trip (`-quality`).
//!
//! The codec is a collaborator behind [`LossyCodec`] so tests and embedders
//! can swap in something other than JPEG.

use crate::core::buffer::{PixelBuffer, CHANNELS};
use crate::core::error::{OperationError, OperationResult};
use image::ImageFormat;

/// One encode/decode cycle at a quality fraction in `[0, 1]`.
pub trait LossyCodec: Send + Sync {
    /// Return a buffer of identical dimensions that went through the codec.
    fn round_trip(&self, buffer: &PixelBuffer, quality: f64) -> OperationResult<PixelBuffer>;
}

/// Baseline JPEG through the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl LossyCodec for JpegCodec {
    fn round_trip(&self, buffer: &PixelBuffer, quality: f64) -> OperationResult<PixelBuffer> {
        let quality = jpeg_quality(quality);
        let bytes = crate::io::encode_jpeg(buffer, quality).map_err(|e| OperationError::Encode {
            quality,
            error: e.to_string(),
        })?;
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
            .map_err(|e| OperationError::Decode(e.to_string()))?;
        Ok(PixelBuffer::from_dynamic(&decoded)?)
    }
}

/// Map a `-quality` factor (1 = worst) onto the codec's `[0, 1]` scale.
///
/// The curve is squared so low factors bite harder.
pub fn quality_fraction(factor: i64) -> f64 {
    (factor as f64 / 100.0).powi(2).max(0.01)
}

/// Map a `[0, 1]` fraction onto JPEG's 1-100 quality.
pub fn jpeg_quality(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Push the buffer through `codec`, keeping the original alpha channel.
pub(crate) fn quality(
    buffer: &mut PixelBuffer,
    factor: i64,
    codec: &dyn LossyCodec,
) -> OperationResult<()> {
    let fraction = quality_fraction(factor);
    let degraded = codec.round_trip(buffer, fraction)?;
    if degraded.dimensions() != buffer.dimensions() {
        let (width, height) = buffer.dimensions();
        let (got_width, got_height) = degraded.dimensions();
        return Err(OperationError::DimensionMismatch {
            width,
            height,
            got_width,
            got_height,
        });
    }

    for (dst, src) in buffer
        .as_raw_mut()
        .chunks_exact_mut(CHANNELS)
        .zip(degraded.as_raw().chunks_exact(CHANNELS))
    {
        dst[..3].copy_from_slice(&src[..3]);
    }
    Ok(())
}
