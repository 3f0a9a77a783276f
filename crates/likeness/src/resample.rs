//! Nearest-neighbor resampling.

use crate::raster::{byte_len, RasterImage, CHANNELS};

/// Resample `src` to exactly `target_width` x `target_height`.
///
/// Target pixel `(x, y)` copies source pixel
/// `(floor(x * src_w / target_w), floor(y * src_h / target_h))` verbatim.
/// Upsampling duplicates source pixels.
///
/// # Panics
///
/// Panics if either target dimension is zero.
#[must_use]
pub fn resample_nearest(src: &RasterImage, target_width: u32, target_height: u32) -> RasterImage {
    assert!(
        target_width > 0 && target_height > 0,
        "resample target must be positive, got {target_width}x{target_height}"
    );

    let (src_width, src_height) = src.dimensions();
    if (src_width, src_height) == (target_width, target_height) {
        return src.clone();
    }

    let src_px = src.as_rgba();
    let src_stride = src_width as usize * CHANNELS;
    let mut out = Vec::with_capacity(byte_len(target_width, target_height));

    // Column offsets are shared by every row.
    let columns: Vec<usize> = (0..u64::from(target_width))
        .map(|x| (x * u64::from(src_width) / u64::from(target_width)) as usize * CHANNELS)
        .collect();

    for y in 0..u64::from(target_height) {
        let sy = (y * u64::from(src_height) / u64::from(target_height)) as usize;
        let row = &src_px[sy * src_stride..(sy + 1) * src_stride];
        for &offset in &columns {
            out.extend_from_slice(&row[offset..offset + CHANNELS]);
        }
    }

    RasterImage::from_parts(target_width, target_height, out)
}
