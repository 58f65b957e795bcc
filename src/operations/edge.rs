//! 3x3 Laplacian edge detection.

use crate::core::buffer::{PixelBuffer, CHANNELS};
use image::Rgba;
use imageproc::filter::filter3x3;
use rayon::prelude::*;

/// Row-major kernel applied by `-edge`.
pub const LAPLACIAN_KERNEL: [i32; 9] = [-1, -1, -1, -1, 8, -1, -1, -1, -1];

/// Convolve interior pixels with [`LAPLACIAN_KERNEL`].
///
/// Only pixels with a full 3x3 neighbourhood are written, so the outermost
/// ring of the buffer keeps its original values. Alpha is copied through.
pub(crate) fn edge(buffer: &mut PixelBuffer) {
    let (width, height) = (buffer.width() as usize, buffer.height() as usize);
    if width < 3 || height < 3 {
        return;
    }

    // filter3x3 replicates the border and filters alpha; keep neither.
    let filtered = filter3x3::<Rgba<u8>, i32, u8>(buffer.as_image(), &LAPLACIAN_KERNEL);
    let filtered = filtered.as_raw();
    let stride = width * CHANNELS;

    buffer
        .as_raw_mut()
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, row)| {
            let src = &filtered[y * stride..(y + 1) * stride];
            for x in 1..width - 1 {
                let at = x * CHANNELS;
                row[at..at + 3].copy_from_slice(&src[at..at + 3]);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let raw = (0..width * height)
            .flat_map(|i| {
                let v = (i * 37 % 251) as u8;
                [v, v.wrapping_mul(3), v.wrapping_add(90), 200]
            })
            .collect();
        PixelBuffer::from_raw(width, height, raw).unwrap()
    }

    #[test]
    fn test_edge_leaves_border_unchanged() {
        let mut buffer = gradient(7, 5);
        let before = buffer.clone();
        edge(&mut buffer);
        for y in 0..5 {
            for x in 0..7 {
                if x == 0 || y == 0 || x == 6 || y == 4 {
                    assert_eq!(buffer.get_pixel(x, y).unwrap(), before.get_pixel(x, y).unwrap());
                }
            }
        }
        assert_ne!(buffer, before);
    }

    #[test]
    fn test_edge_flat_interior_goes_black() {
        let mut buffer = PixelBuffer::filled(4, 4, [120, 60, 30, 99]).unwrap();
        edge(&mut buffer);
        assert_eq!(buffer.get_pixel(1, 1).unwrap(), [0, 0, 0, 99]);
        assert_eq!(buffer.get_pixel(0, 0).unwrap(), [120, 60, 30, 99]);
    }

    #[test]
    fn test_edge_detects_spike() {
        let mut buffer = PixelBuffer::filled(3, 3, [0, 0, 0, 255]).unwrap();
        buffer.set_pixel(1, 1, [20, 20, 20, 255]).unwrap();
        edge(&mut buffer);
        assert_eq!(buffer.get_pixel(1, 1).unwrap(), [160, 160, 160, 255]);
    }

    #[test]
    fn test_edge_too_small_is_noop() {
        let mut buffer = gradient(2, 9);
        let before = buffer.clone();
        edge(&mut buffer);
        assert_eq!(buffer, before);
    }
}
