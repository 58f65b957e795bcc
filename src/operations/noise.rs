//! Uniform additive noise.

use crate::core::buffer::{PixelBuffer, CHANNELS};
use rand::Rng;

/// Add one draw from `-amount..=amount` to R, G and B of each pixel.
pub(crate) fn noise<R: Rng + ?Sized>(buffer: &mut PixelBuffer, amount: i64, rng: &mut R) {
    let amount = amount.abs();
    if amount == 0 {
        return;
    }
    for pixel in buffer.as_raw_mut().chunks_exact_mut(CHANNELS) {
        let n = rng.random_range(-amount..=amount);
        for channel in &mut pixel[..3] {
            *channel = (*channel as i64 + n).clamp(0, 255) as u8;
        }
    }
}
