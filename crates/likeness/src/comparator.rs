//! Decode, prepare, score and decide.
//!
//! A comparison walks `Idle -> Decoding -> SizeCheck | Resampling -> Scoring
//! -> Decided`. Strict mode always takes the size check and relaxed mode
//! always resamples both images to the policy's canonical size. A strict
//! dimension mismatch decides the call without scoring.

use crate::config::ComparatorConfig;
use crate::decode::{Decoder, FormatHint};
use crate::policy::{ComparisonMode, ComparisonPolicy};
use crate::raster::RasterImage;
use crate::resample::resample_nearest;
use crate::result::{ImageSlot, LikenessError, LikenessResult};
use crate::score::{diff_mask, PixelDiffScorer, Scorer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Pipeline stage of a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing done yet
    Idle,
    /// Decoding both inputs
    Decoding,
    /// Checking that dimensions agree
    SizeCheck,
    /// Resampling both images to the canonical size
    Resampling,
    /// Counting differing pixels
    Scoring,
    /// Result produced
    Decided,
}

/// Why a comparison ended the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Differing pixels stayed within tolerance
    Matched,
    /// Strict mode saw different dimensions; the scorer did not run
    DimensionMismatch {
        /// Reference `(width, height)`
        reference: (u32, u32),
        /// Candidate `(width, height)`
        candidate: (u32, u32),
    },
    /// Too many pixels differed
    ToleranceExceeded,
}

/// Decision for one pair of images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Whether the images are accepted as the same content
    pub matched: bool,
    /// Pixels whose distance exceeded the threshold
    pub differing_pixel_count: usize,
    /// Pixels scanned (zero when the scorer did not run)
    pub total_pixels_compared: usize,
    /// Mode that produced this result
    pub mode: ComparisonMode,
    /// Reason for the decision
    pub outcome: MatchOutcome,
    /// Largest normalized pixel distance observed
    pub peak_distance: f64,
}

impl ComparisonResult {
    /// No pixel differed
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.matched && self.differing_pixel_count == 0
    }

    /// Whether the rejection came from a dimension mismatch
    #[must_use]
    pub const fn is_dimension_mismatch(&self) -> bool {
        matches!(self.outcome, MatchOutcome::DimensionMismatch { .. })
    }

    /// Fraction of compared pixels that differed, in `[0, 1]`
    #[must_use]
    pub fn differing_ratio(&self) -> f64 {
        if self.total_pixels_compared == 0 {
            0.0
        } else {
            self.differing_pixel_count as f64 / self.total_pixels_compared as f64
        }
    }
}

enum Prepared<'a> {
    Ready(Cow<'a, RasterImage>, Cow<'a, RasterImage>),
    Mismatch {
        reference: (u32, u32),
        candidate: (u32, u32),
    },
}

/// Stateless image comparator
///
/// Holds only configuration, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct ImageComparator<S = PixelDiffScorer> {
    config: ComparatorConfig,
    decoder: Decoder,
    scorer: S,
}

impl Default for ImageComparator {
    fn default() -> Self {
        let config = ComparatorConfig::default();
        Self {
            decoder: Decoder::new(config.limits),
            config,
            scorer: PixelDiffScorer,
        }
    }
}

impl ImageComparator {
    /// Create a comparator from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Config`] if any policy is out of range
    pub fn new(config: ComparatorConfig) -> LikenessResult<Self> {
        config.validate()?;
        Ok(Self {
            decoder: Decoder::new(config.limits),
            config,
            scorer: PixelDiffScorer,
        })
    }
}

impl<S: Scorer> ImageComparator<S> {
    /// Replace the scorer
    #[must_use]
    pub fn with_scorer<T: Scorer>(self, scorer: T) -> ImageComparator<T> {
        ImageComparator {
            config: self.config,
            decoder: self.decoder,
            scorer,
        }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Compare two encoded images, sniffing both formats
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Decode`] naming the input that failed
    pub fn compare(
        &self,
        reference: &[u8],
        candidate: &[u8],
        mode: ComparisonMode,
    ) -> LikenessResult<ComparisonResult> {
        self.compare_with_hints(
            (reference, FormatHint::NONE),
            (candidate, FormatHint::NONE),
            mode,
        )
    }

    /// Compare two encoded images with fallback format hints
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Decode`] naming the input that failed
    pub fn compare_with_hints(
        &self,
        reference: (&[u8], FormatHint),
        candidate: (&[u8], FormatHint),
        mode: ComparisonMode,
    ) -> LikenessResult<ComparisonResult> {
        let _span = tracing::debug_span!("compare", %mode).entered();
        let (reference, candidate) = self.decode_pair(reference, candidate)?;
        Ok(self.compare_images(&reference, &candidate, mode))
    }

    /// Compare two already decoded images
    #[must_use]
    pub fn compare_images(
        &self,
        reference: &RasterImage,
        candidate: &RasterImage,
        mode: ComparisonMode,
    ) -> ComparisonResult {
        self.evaluate(reference, candidate, mode, false).0
    }

    /// Compare two encoded images and render the diff mask from the same
    /// decoded pair. The mask is `None` on a dimension mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Decode`] naming the input that failed
    pub fn compare_with_diff(
        &self,
        reference: (&[u8], FormatHint),
        candidate: (&[u8], FormatHint),
        mode: ComparisonMode,
    ) -> LikenessResult<(ComparisonResult, Option<RasterImage>)> {
        let _span = tracing::debug_span!("compare", %mode).entered();
        let (reference, candidate) = self.decode_pair(reference, candidate)?;
        Ok(self.evaluate(&reference, &candidate, mode, true))
    }

    /// Diff visualization of the prepared pair; `None` on a dimension mismatch
    ///
    /// # Errors
    ///
    /// Returns [`LikenessError::Decode`] naming the input that failed
    pub fn render_diff(
        &self,
        reference: &[u8],
        candidate: &[u8],
        mode: ComparisonMode,
    ) -> LikenessResult<Option<RasterImage>> {
        let (_, mask) = self.compare_with_diff(
            (reference, FormatHint::NONE),
            (candidate, FormatHint::NONE),
            mode,
        )?;
        Ok(mask)
    }

    fn evaluate(
        &self,
        reference: &RasterImage,
        candidate: &RasterImage,
        mode: ComparisonMode,
        render: bool,
    ) -> (ComparisonResult, Option<RasterImage>) {
        let policy = self.config.policy(mode);

        let (result, mask) = match prepare(reference, candidate, mode, policy) {
            Prepared::Mismatch {
                reference,
                candidate,
            } => {
                tracing::debug!(?reference, ?candidate, "dimension mismatch");
                let result = ComparisonResult {
                    matched: false,
                    differing_pixel_count: 0,
                    total_pixels_compared: 0,
                    mode,
                    outcome: MatchOutcome::DimensionMismatch {
                        reference,
                        candidate,
                    },
                    peak_distance: 0.0,
                };
                (result, None)
            }
            Prepared::Ready(a, b) => {
                enter(Stage::Scoring);
                let summary = self
                    .scorer
                    .score(&a, &b, policy.pixel_threshold, policy.metric);
                let matched = policy.accepts(summary.differing, summary.total);
                let result = ComparisonResult {
                    matched,
                    differing_pixel_count: summary.differing,
                    total_pixels_compared: summary.total,
                    mode,
                    outcome: if matched {
                        MatchOutcome::Matched
                    } else {
                        MatchOutcome::ToleranceExceeded
                    },
                    peak_distance: summary.peak_distance,
                };
                let mask =
                    render.then(|| diff_mask(&a, &b, policy.pixel_threshold, policy.metric));
                (result, mask)
            }
        };

        enter(Stage::Decided);
        tracing::debug!(
            matched = result.matched,
            differing = result.differing_pixel_count,
            total = result.total_pixels_compared,
            "comparison decided"
        );
        (result, mask)
    }

    fn decode_pair(
        &self,
        (reference, reference_hint): (&[u8], FormatHint),
        (candidate, candidate_hint): (&[u8], FormatHint),
    ) -> LikenessResult<(RasterImage, RasterImage)> {
        enter(Stage::Idle);
        enter(Stage::Decoding);
        let reference = self
            .decoder
            .decode(reference, reference_hint)
            .map_err(|source| LikenessError::Decode {
                slot: ImageSlot::Reference,
                source,
            })?;
        let candidate = self
            .decoder
            .decode(candidate, candidate_hint)
            .map_err(|source| LikenessError::Decode {
                slot: ImageSlot::Candidate,
                source,
            })?;
        Ok((reference, candidate))
    }
}

fn prepare<'a>(
    reference: &'a RasterImage,
    candidate: &'a RasterImage,
    mode: ComparisonMode,
    policy: &ComparisonPolicy,
) -> Prepared<'a> {
    match mode {
        ComparisonMode::Strict => {
            enter(Stage::SizeCheck);
            if reference.dimensions() == candidate.dimensions() {
                Prepared::Ready(Cow::Borrowed(reference), Cow::Borrowed(candidate))
            } else {
                Prepared::Mismatch {
                    reference: reference.dimensions(),
                    candidate: candidate.dimensions(),
                }
            }
        }
        ComparisonMode::Relaxed => {
            enter(Stage::Resampling);
            let size = policy.resample_to.unwrap_or_default();
            Prepared::Ready(
                Cow::Owned(resample_nearest(reference, size.width, size.height)),
                Cow::Owned(resample_nearest(candidate, size.width, size.height)),
            )
        }
    }
}

fn enter(stage: Stage) {
    tracing::trace!(?stage, "comparison stage");
}

/// Compare two encoded images with the built-in policies
///
/// # Errors
///
/// Returns [`LikenessError::Decode`] naming the input that failed
pub fn compare(
    reference: &[u8],
    candidate: &[u8],
    mode: ComparisonMode,
) -> LikenessResult<ComparisonResult> {
    ImageComparator::default().compare(reference, candidate, mode)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::policy::CanonicalSize;
    use crate::score::{DistanceMetric, ScoreSummary};
    use std::cell::Cell;

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        RasterImage::solid(width, height, rgba).to_png().unwrap()
    }

    /// Half of the rows black, the rest white
    fn split_png(width: u32, height: u32, black_rows: u32) -> Vec<u8> {
        let mut raw = Vec::new();
        for y in 0..height {
            let px = if y < black_rows {
                [0, 0, 0, 255]
            } else {
                [255, 255, 255, 255]
            };
            for _ in 0..width {
                raw.extend_from_slice(&px);
            }
        }
        RasterImage::from_rgba(width, height, raw)
            .unwrap()
            .to_png()
            .unwrap()
    }

    #[derive(Default)]
    struct CountingScorer {
        calls: Cell<usize>,
    }

    impl Scorer for CountingScorer {
        fn score(
            &self,
            a: &RasterImage,
            b: &RasterImage,
            threshold: f64,
            metric: DistanceMetric,
        ) -> ScoreSummary {
            self.calls.set(self.calls.get() + 1);
            PixelDiffScorer.score(a, b, threshold, metric)
        }
    }

    #[test]
    fn test_strict_self_comparison_is_identical() {
        let img = png(100, 100, [255, 0, 0, 255]);
        let result = compare(&img, &img, ComparisonMode::Strict).unwrap();
        assert!(result.matched);
        assert!(result.is_identical());
        assert_eq!(result.total_pixels_compared, 10_000);
        assert_eq!(result.outcome, MatchOutcome::Matched);
        assert_eq!(result.mode, ComparisonMode::Strict);
    }

    #[test]
    fn test_relaxed_black_vs_white_rejects() {
        let black = png(100, 100, [0, 0, 0, 255]);
        let white = png(100, 100, [255, 255, 255, 255]);
        let result = compare(&black, &white, ComparisonMode::Relaxed).unwrap();
        assert!(!result.matched);
        assert_eq!(result.differing_pixel_count, 2500);
        assert_eq!(result.total_pixels_compared, 2500);
        assert_eq!(result.outcome, MatchOutcome::ToleranceExceeded);
        assert!((result.differing_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_strict_dimension_mismatch_skips_scorer() {
        let comparator = ImageComparator::default().with_scorer(CountingScorer::default());
        let a = png(100, 100, [0, 0, 0, 255]);
        let b = png(100, 150, [0, 0, 0, 255]);
        let result = comparator.compare(&a, &b, ComparisonMode::Strict).unwrap();
        assert!(!result.matched);
        assert!(result.is_dimension_mismatch());
        assert_eq!(result.differing_pixel_count, 0);
        assert_eq!(result.total_pixels_compared, 0);
        assert_eq!(
            result.outcome,
            MatchOutcome::DimensionMismatch {
                reference: (100, 100),
                candidate: (100, 150),
            }
        );
        assert_eq!(comparator.scorer.calls.get(), 0);
    }

    #[test]
    fn test_relaxed_ignores_dimension_difference() {
        let comparator = ImageComparator::default().with_scorer(CountingScorer::default());
        let a = png(100, 100, [0, 0, 0, 255]);
        let b = png(100, 150, [0, 0, 0, 255]);
        let result = comparator.compare(&a, &b, ComparisonMode::Relaxed).unwrap();
        assert!(result.matched);
        assert_eq!(result.total_pixels_compared, 2500);
        assert_eq!(comparator.scorer.calls.get(), 1);
    }

    #[test]
    fn test_strict_tolerance_boundary() {
        // 10 of 100 rows differ: 10% is not strictly below the budget.
        let reference = split_png(100, 100, 0);
        let at_budget = split_png(100, 100, 10);
        let under_budget = split_png(100, 100, 9);

        let rejected = compare(&reference, &at_budget, ComparisonMode::Strict).unwrap();
        assert_eq!(rejected.differing_pixel_count, 1000);
        assert!(!rejected.matched);

        let accepted = compare(&reference, &under_budget, ComparisonMode::Strict).unwrap();
        assert_eq!(accepted.differing_pixel_count, 900);
        assert!(accepted.matched);
    }

    #[test]
    fn test_relaxed_accepts_partial_change() {
        let reference = split_png(80, 80, 0);
        let candidate = split_png(80, 80, 40);
        let result = compare(&reference, &candidate, ComparisonMode::Relaxed).unwrap();
        assert_eq!(result.differing_pixel_count, 1250);
        assert!(result.matched);
    }

    #[test]
    fn test_minor_noise_is_tolerated_in_strict() {
        let a = png(20, 20, [120, 130, 140, 255]);
        let b = png(20, 20, [125, 128, 138, 255]);
        let result = compare(&a, &b, ComparisonMode::Strict).unwrap();
        assert!(result.matched);
        assert_eq!(result.differing_pixel_count, 0);
        assert!(result.peak_distance > 0.0);
    }

    #[test]
    fn test_decode_failures_name_slot() {
        let good = png(4, 4, [0, 0, 0, 255]);

        let err = compare(&[], &good, ComparisonMode::Strict).unwrap_err();
        assert_eq!(err.slot(), Some(ImageSlot::Reference));
        assert!(matches!(
            err,
            LikenessError::Decode {
                source: DecodeError::Empty,
                ..
            }
        ));

        let err = compare(&good, b"garbage bytes", ComparisonMode::Relaxed).unwrap_err();
        assert_eq!(err.slot(), Some(ImageSlot::Candidate));
        assert!(err.is_decode());
    }

    #[test]
    fn test_custom_canonical_size_is_applied() {
        let config = ComparatorConfig::default().with_relaxed(
            ComparisonPolicy::RELAXED.with_resample_to(Some(CanonicalSize::new(10, 8))),
        );
        let comparator = ImageComparator::new(config).unwrap();
        let a = png(30, 20, [0, 0, 0, 255]);
        let b = png(20, 30, [0, 0, 0, 255]);
        let result = comparator.compare(&a, &b, ComparisonMode::Relaxed).unwrap();
        assert!(result.matched);
        assert_eq!(result.total_pixels_compared, 80);
    }

    #[test]
    fn test_new_rejects_config_that_changes_mode_pipeline() {
        let resampling_strict = ComparatorConfig::default().with_strict(
            ComparisonPolicy::STRICT.with_resample_to(Some(CanonicalSize::square(10))),
        );
        let err = ImageComparator::new(resampling_strict).unwrap_err();
        assert!(err.to_string().contains("strict"));

        let unresampled_relaxed = ComparatorConfig::default()
            .with_relaxed(ComparisonPolicy::RELAXED.with_resample_to(None));
        let err = ImageComparator::new(unresampled_relaxed).unwrap_err();
        assert!(err.to_string().contains("relaxed"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config =
            ComparatorConfig::default().with_relaxed(ComparisonPolicy::RELAXED.with_tolerance(0.0));
        assert!(ImageComparator::new(config).is_err());
    }

    #[test]
    fn test_render_diff() {
        let black = png(10, 10, [0, 0, 0, 255]);
        let white = png(10, 10, [255, 255, 255, 255]);
        let comparator = ImageComparator::default();

        let mask = comparator
            .render_diff(&black, &white, ComparisonMode::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(mask.dimensions(), (10, 10));
        assert!(mask.pixels().all(|p| p == [255, 0, 0, 255]));

        let relaxed = comparator
            .render_diff(&black, &white, ComparisonMode::Relaxed)
            .unwrap()
            .unwrap();
        assert_eq!(relaxed.dimensions(), (50, 50));

        let tall = png(10, 12, [0, 0, 0, 255]);
        assert!(comparator
            .render_diff(&black, &tall, ComparisonMode::Strict)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_compare_with_diff_honors_hints() {
        let comparator = ImageComparator::default();
        let black = png(6, 4, [0, 0, 0, 255]);
        let white = png(6, 4, [255, 255, 255, 255]);

        let (result, mask) = comparator
            .compare_with_diff(
                (&black, FormatHint::from_extension("png")),
                (&white, FormatHint::from_extension("png")),
                ComparisonMode::Strict,
            )
            .unwrap();
        assert_eq!(result.differing_pixel_count, 24);
        let mask = mask.unwrap();
        assert_eq!(mask.dimensions(), (6, 4));
        assert_eq!(result, comparator.compare(&black, &white, ComparisonMode::Strict).unwrap());

        // A hint is the only way to decode a headerless buffer, and both the
        // verdict and the mask go through it.
        let err = comparator
            .compare_with_diff(
                (&black, FormatHint::NONE),
                (b"\x00\x01\x02\x03", FormatHint::from_extension("png")),
                ComparisonMode::Strict,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LikenessError::Decode {
                slot: ImageSlot::Candidate,
                source: DecodeError::Malformed { .. },
            }
        ));
    }

    #[test]
    fn test_result_serializes_outcome_kind() {
        let a = png(2, 2, [0, 0, 0, 255]);
        let b = png(2, 3, [0, 0, 0, 255]);
        let result = compare(&a, &b, ComparisonMode::Strict).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["matched"], false);
        assert_eq!(json["mode"], "strict");
        assert_eq!(json["outcome"]["kind"], "dimension_mismatch");
        assert_eq!(json["outcome"]["candidate"][1], 3);
    }

    #[test]
    fn test_comparator_is_shareable_across_threads() {
        let comparator = ImageComparator::default();
        let red = png(40, 40, [255, 0, 0, 255]);
        let blue = png(40, 40, [0, 0, 255, 255]);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let comparator = &comparator;
                    let (a, b) = if i % 2 == 0 { (&red, &red) } else { (&red, &blue) };
                    scope.spawn(move || comparator.compare(a, b, ComparisonMode::Strict).unwrap())
                })
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                let result = handle.join().unwrap();
                assert_eq!(result.matched, i % 2 == 0);
            }
        });
    }
}
