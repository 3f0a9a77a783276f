//! Per-pixel difference scoring.
//!
//! Every [`DistanceMetric`] maps a pair of RGBA pixels into `[0, 1]`, is zero
//! for identical pixels and never decreases when a single channel difference
//! grows. A pixel "differs" when its distance is strictly greater than the
//! threshold, so raising the threshold can only lower the count.

use crate::raster::RasterImage;
use serde::{Deserialize, Serialize};

/// Largest Euclidean RGBA distance, `sqrt(4 * 255^2)`
const EUCLIDEAN_MAX: f64 = 510.0;
/// Largest Manhattan RGBA distance, `4 * 255`
const MANHATTAN_MAX: f64 = 1020.0;

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// How the distance between two pixels is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance over R, G, B, A divided by 510
    #[default]
    Euclidean,
    /// Sum of absolute R, G, B, A differences divided by 1020
    Manhattan,
    /// Luma-weighted RGB Euclidean distance (0.299, 0.587, 0.114), alpha ignored
    Perceptual,
}

impl DistanceMetric {
    /// Normalized distance between two RGBA pixels, in `[0, 1]`
    #[must_use]
    pub fn distance(self, a: &[u8], b: &[u8]) -> f64 {
        let d = |i: usize| f64::from(a[i]) - f64::from(b[i]);
        match self {
            Self::Euclidean => {
                let sum: f64 = (0..4).map(|i| d(i) * d(i)).sum();
                sum.sqrt() / EUCLIDEAN_MAX
            }
            Self::Manhattan => {
                let sum: f64 = (0..4).map(|i| d(i).abs()).sum();
                sum / MANHATTAN_MAX
            }
            Self::Perceptual => {
                let dr = d(0) * LUMA_R;
                let dg = d(1) * LUMA_G;
                let db = d(2) * LUMA_B;
                (dr * dr + dg * dg + db * db).sqrt() / perceptual_max()
            }
        }
    }
}

fn perceptual_max() -> f64 {
    255.0 * (LUMA_R * LUMA_R + LUMA_G * LUMA_G + LUMA_B * LUMA_B).sqrt()
}

/// Counts produced by a full scan of two equally sized images
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Pixels whose distance exceeded the threshold
    pub differing: usize,
    /// Pixels scanned
    pub total: usize,
    /// Largest distance seen
    pub peak_distance: f64,
}

/// Scores two rasters of identical dimensions against a threshold
pub trait Scorer {
    /// Scan every pixel of `a` and `b`
    ///
    /// Callers must pass rasters with identical dimensions.
    fn score(
        &self,
        a: &RasterImage,
        b: &RasterImage,
        threshold: f64,
        metric: DistanceMetric,
    ) -> ScoreSummary;
}

/// Thresholded whole-image pixel-difference scorer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelDiffScorer;

impl Scorer for PixelDiffScorer {
    fn score(
        &self,
        a: &RasterImage,
        b: &RasterImage,
        threshold: f64,
        metric: DistanceMetric,
    ) -> ScoreSummary {
        assert_same_dimensions(a, b);

        let mut differing = 0usize;
        let mut peak_distance = 0.0f64;
        for (pa, pb) in a.pixels().zip(b.pixels()) {
            let distance = metric.distance(pa, pb);
            if distance > threshold {
                differing += 1;
            }
            peak_distance = peak_distance.max(distance);
        }

        ScoreSummary {
            differing,
            total: a.pixel_count(),
            peak_distance,
        }
    }
}

/// Number of pixels whose `metric` distance exceeds `threshold`
///
/// # Panics
///
/// Panics if the rasters differ in size.
#[must_use]
pub fn count_differing(
    a: &RasterImage,
    b: &RasterImage,
    threshold: f64,
    metric: DistanceMetric,
) -> usize {
    PixelDiffScorer.score(a, b, threshold, metric).differing
}

/// Render a diff visualization: differing pixels in opaque red, the rest as
/// the dimmed pixel of `a`.
///
/// # Panics
///
/// Panics if the rasters differ in size.
#[must_use]
pub fn diff_mask(
    a: &RasterImage,
    b: &RasterImage,
    threshold: f64,
    metric: DistanceMetric,
) -> RasterImage {
    assert_same_dimensions(a, b);

    let mut out = Vec::with_capacity(a.as_rgba().len());
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        if metric.distance(pa, pb) > threshold {
            out.extend_from_slice(&[255, 0, 0, 255]);
        } else {
            out.extend_from_slice(&[pa[0] / 2, pa[1] / 2, pa[2] / 2, 128]);
        }
    }
    let (width, height) = a.dimensions();
    RasterImage::from_parts(width, height, out)
}

fn assert_same_dimensions(a: &RasterImage, b: &RasterImage) {
    assert_eq!(
        a.dimensions(),
        b.dimensions(),
        "scored rasters must have identical dimensions"
    );
}
