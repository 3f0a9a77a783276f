//! Decoded RGBA8 pixel buffers.

use crate::result::{LikenessError, LikenessResult};
use image::ImageEncoder;

/// Bytes per RGBA8 pixel
pub const CHANNELS: usize = 4;

/// An immutable RGBA8 image with explicit dimensions.
///
/// The buffer always holds `width * height * 4` bytes in R, G, B, A order and
/// both dimensions are positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap a raw RGBA8 buffer
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::InvalidRaster`] if a dimension is zero or the
    /// buffer length is not `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> LikenessResult<Self> {
        if width == 0 || height == 0 {
            return Err(LikenessError::invalid_raster(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(LikenessError::invalid_raster(format!(
                "{width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image filled with a single color
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        assert!(width > 0 && height > 0, "solid raster needs positive dimensions");
        let pixels = rgba.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build from an already-validated buffer (crate-internal)
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), byte_len(width, height));
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes
    #[must_use]
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume into the raw RGBA bytes
    #[must_use]
    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[offset..offset + CHANNELS]);
        px
    }

    /// Iterate pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.pixels.chunks_exact(CHANNELS)
    }

    /// Encode as PNG
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Encode`] if the encoder fails
    pub fn to_png(&self) -> LikenessResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
        encoder
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| LikenessError::Encode {
                message: format!("Failed to encode PNG: {e}"),
            })?;
        Ok(buffer)
    }
}

pub(crate) const fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
