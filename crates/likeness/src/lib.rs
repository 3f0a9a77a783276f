//! likeness: whole-image pixel-difference similarity scoring
//!
//! Decides whether two raster images show the same content closely enough to
//! accept, under a strict policy (same-document re-upload) or a relaxed one
//! (coarse likeness between a live capture and a stored photo).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────────────┐   ┌──────────┐   ┌──────────┐
//! │ bytes A  │──►│  decode  │──►│ size check (strict)│──►│  score   │──►│ decision │
//! │ bytes B  │   │  RGBA8   │   │ resample (relaxed) │   │ Δ > t    │   │ n < N·τ  │
//! └──────────┘   └──────────┘   └────────────────────┘   └──────────┘   └──────────┘
//! ```
//!
//! Every call is independent: no caching, no global state, no I/O.
//!
//! ```
//! use likeness::{compare, ComparisonMode, RasterImage};
//!
//! let png = RasterImage::solid(100, 100, [255, 0, 0, 255]).to_png()?;
//! let result = compare(&png, &png, ComparisonMode::Strict)?;
//! assert!(result.matched);
//! assert_eq!(result.differing_pixel_count, 0);
//! # Ok::<(), likeness::LikenessError>(())
//! ```

#![warn(missing_docs)]

mod comparator;
mod config;
pub mod decode;
mod policy;
mod raster;
pub mod resample;
mod result;
pub mod score;

pub use comparator::{compare, ComparisonResult, ImageComparator, MatchOutcome, Stage};
pub use config::ComparatorConfig;
pub use decode::{decode, decode_with_hint, DecodeError, DecodeLimits, Decoder, FormatHint};
pub use policy::{CanonicalSize, ComparisonMode, ComparisonPolicy};
pub use raster::RasterImage;
pub use resample::resample_nearest;
pub use result::{ImageSlot, LikenessError, LikenessResult};
pub use score::{count_differing, diff_mask, DistanceMetric, PixelDiffScorer, ScoreSummary, Scorer};

/// Re-exported so callers can build [`FormatHint`]s without depending on `image`
pub use image::ImageFormat;
