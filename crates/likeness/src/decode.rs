//! Decoding encoded image bytes into [`RasterImage`]s.
//!
//! Format resolution is deterministic for a given buffer: the magic bytes are
//! sniffed first, and a [`FormatHint`] only applies when the sniff finds
//! nothing. PNG and JPEG are always available; GIF, BMP and WebP are behind
//! the crate features of the same name.

use crate::raster::RasterImage;
use image::{ImageError, ImageFormat, ImageReader, Limits};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Errors produced while decoding an image buffer
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Zero-length input
    #[error("image buffer is empty")]
    Empty,

    /// Magic bytes match no known raster format and no hint was usable
    #[error("unrecognized image format")]
    Unrecognized,

    /// Format was identified but its decoder is not compiled in
    #[error("unsupported image format: {format}")]
    Unsupported {
        /// Format name
        format: String,
    },

    /// Truncated or corrupt data
    #[error("malformed {format} data: {message}")]
    Malformed {
        /// Format name
        format: String,
        /// Decoder message
        message: String,
    },

    /// Image exceeds the configured [`DecodeLimits`]
    #[error("image exceeds decode limits: {message}")]
    LimitsExceeded {
        /// Decoder message
        message: String,
    },

    /// Decoded to a zero-area image
    #[error("image has no pixels")]
    EmptyImage,
}

/// Optional format hint, typically from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatHint(Option<ImageFormat>);

impl FormatHint {
    /// No hint; rely on the sniff alone
    pub const NONE: Self = Self(None);

    /// Hint for a known format
    #[must_use]
    pub const fn format(format: ImageFormat) -> Self {
        Self(Some(format))
    }

    /// Hint from an extension such as `"png"` or `"JPG"`
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        Self(ImageFormat::from_extension(ext))
    }

    /// Hint from a path's extension
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::NONE, Self::from_extension)
    }

    /// The hinted format, if any
    #[must_use]
    pub const fn get(self) -> Option<ImageFormat> {
        self.0
    }
}

/// Resource limits applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum image width in pixels
    pub max_width: u32,
    /// Maximum image height in pixels
    pub max_height: u32,
    /// Maximum bytes the decoder may allocate
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 16_384,
            max_height: 16_384,
            max_alloc_bytes: 512 * 1024 * 1024,
        }
    }
}

impl DecodeLimits {
    /// Set the maximum dimensions
    #[must_use]
    pub const fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Set the allocation ceiling
    #[must_use]
    pub const fn with_max_alloc_bytes(mut self, bytes: u64) -> Self {
        self.max_alloc_bytes = bytes;
        self
    }

    fn to_image_limits(self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_width);
        limits.max_image_height = Some(self.max_height);
        limits.max_alloc = Some(self.max_alloc_bytes);
        limits
    }
}

/// Image decoder with configurable limits
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    limits: DecodeLimits,
}

impl Decoder {
    /// Create a decoder with the given limits
    #[must_use]
    pub const fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    /// Limits in effect
    #[must_use]
    pub const fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Decode `bytes` into an RGBA8 raster
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for empty, unrecognized, unsupported,
    /// truncated or oversized input.
    pub fn decode(&self, bytes: &[u8], hint: FormatHint) -> Result<RasterImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let format = resolve_format(bytes, hint)?;
        let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
        reader.limits(self.limits.to_image_limits());

        let decoded = reader
            .decode()
            .map_err(|e| map_image_error(e, format))?;
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage);
        }

        tracing::debug!(?format, width, height, "decoded image");
        Ok(RasterImage::from_parts(width, height, rgba.into_raw()))
    }
}

/// Decode with default limits, sniffing the format
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    Decoder::default().decode(bytes, FormatHint::NONE)
}

/// Decode with default limits and a fallback format hint
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode_with_hint(bytes: &[u8], hint: FormatHint) -> Result<RasterImage, DecodeError> {
    Decoder::default().decode(bytes, hint)
}

/// Identify the encoded format of `bytes` without decoding
///
/// # Errors
///
/// Returns [`DecodeError::Empty`] or [`DecodeError::Unrecognized`].
pub fn sniff_format(bytes: &[u8], hint: FormatHint) -> Result<ImageFormat, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    resolve_format(bytes, hint)
}

fn resolve_format(bytes: &[u8], hint: FormatHint) -> Result<ImageFormat, DecodeError> {
    match image::guess_format(bytes) {
        Ok(format) => Ok(format),
        Err(_) => hint.get().ok_or(DecodeError::Unrecognized),
    }
}

fn map_image_error(err: ImageError, format: ImageFormat) -> DecodeError {
    let name = format_name(format);
    match err {
        ImageError::Limits(e) => DecodeError::LimitsExceeded {
            message: e.to_string(),
        },
        ImageError::Unsupported(_) => DecodeError::Unsupported { format: name },
        other => DecodeError::Malformed {
            format: name,
            message: other.to_string(),
        },
    }
}

/// Lowercase format name, e.g. `"png"`
#[must_use]
pub fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map_or_else(|| format!("{format:?}").to_lowercase(), |ext| (*ext).to_string())
}
