//! Per-pixel colour operations: modulate, contrast, normalize.
//!
//! All three touch R, G and B only; alpha passes through.

use crate::core::buffer::{PixelBuffer, CHANNELS};
use rayon::prelude::*;

/// Rec. 601-ish weights used by `-modulate` for its grey target.
const SATURATION_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Rec. 709 weights used by `-normalize`.
const LUMINANCE_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

#[inline]
pub(crate) fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn weighted(pixel: &[u8], weights: &[f64; 3]) -> f64 {
    weights[0] * pixel[0] as f64 + weights[1] * pixel[1] as f64 + weights[2] * pixel[2] as f64
}

/// Blend toward grey by `factor / 100`, then add `brightness` to every channel.
pub(crate) fn modulate(buffer: &mut PixelBuffer, factor: i64, brightness: i64) {
    let ratio = (factor as f64 - 100.0) / 100.0 + 1.0;
    let brightness = brightness as f64;

    buffer
        .as_raw_mut()
        .par_chunks_exact_mut(CHANNELS)
        .for_each(|pixel| {
            let gray = weighted(pixel, &SATURATION_WEIGHTS);
            for channel in &mut pixel[..3] {
                let saturated = clamp_channel(gray + (*channel as f64 - gray) * ratio);
                *channel = clamp_channel(saturated as f64 + brightness);
            }
        });
}

/// Contrast stretch pivoting on 128.
pub(crate) fn contrast(buffer: &mut PixelBuffer, value: i64) {
    let value = value as f64;
    let factor = (259.0 * (value + 255.0)) / (255.0 * (259.0 - value));

    buffer
        .as_raw_mut()
        .par_chunks_exact_mut(CHANNELS)
        .for_each(|pixel| {
            for channel in &mut pixel[..3] {
                *channel = clamp_channel(factor * (*channel as f64 - 128.0) + 128.0);
            }
        });
}

/// Stretch the luminance range of the buffer to 0..=255.
///
/// A flat buffer (min == max) is left untouched.
pub(crate) fn normalize(buffer: &mut PixelBuffer) {
    let (min, max) = buffer
        .as_raw()
        .par_chunks_exact(CHANNELS)
        .map(|pixel| {
            let luminance = weighted(pixel, &LUMINANCE_WEIGHTS);
            (luminance, luminance)
        })
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |a, b| (a.0.min(b.0), a.1.max(b.1)),
        );

    let range = max - min;
    if range <= 0.0 {
        log::debug!("normalize: flat luminance {min:.2}, nothing to stretch");
        return;
    }

    buffer
        .as_raw_mut()
        .par_chunks_exact_mut(CHANNELS)
        .for_each(|pixel| {
            for channel in &mut pixel[..3] {
                *channel = clamp_channel((*channel as f64 - min) / range * 255.0);
            }
        });
}
