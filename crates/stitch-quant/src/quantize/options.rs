//! Quantization options and configuration.
//!
//! [`ProcessingConfig`] is the caller-facing configuration. It accepts any
//! numeric values; [`ProcessingConfig::normalized`] clamps and rounds them
//! into a [`NormalizedConfig`] that the pipeline actually runs with.

use serde::{Deserialize, Serialize};

/// Largest palette the pipeline will attempt; labels are `u16`.
pub const MAX_COLORS: usize = u16::MAX as usize;

/// Ordered dithering applied after the palette is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherMode {
    /// Plain nearest-color labels.
    #[default]
    None,
    /// 4×4 Bayer perturbation of lightness before re-assignment.
    Bayer,
}

/// Configuration for one quantization run.
///
/// # Defaults
///
/// - Color count: 16
/// - Dither: none
/// - Smoothing: 0.3 (one bilateral pass)
/// - Simplify: 0.2 (no label smoothing pass, rounds to zero)
/// - Minimum region size: 4 pixels
///
/// # Example
///
/// ```
/// use stitch_quant::{DitherMode, ProcessingConfig};
///
/// let config = ProcessingConfig::new()
///     .color_count(8)
///     .smoothing(0.0)
///     .dither(DitherMode::Bayer);
/// assert_eq!(config.normalized().color_count, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingConfig {
    /// Requested number of clusters. Rounded, at least 1.
    pub color_count: f64,

    /// Ordered dithering mode.
    pub dither_mode: DitherMode,

    /// Edge-preserving smoothing strength in `[0, 1]`.
    ///
    /// - 0.0 = no smoothing
    /// - below 0.5 = one pass
    /// - 0.5 and above = two passes
    pub smoothing_amount: f64,

    /// Label smoothing strength in `[0, 1]`.
    ///
    /// Sets both the number of majority-vote passes (`round(2 * amount)`) and
    /// how far a pixel may drift perceptually when it switches label.
    pub simplify_amount: f64,

    /// Components smaller than this many pixels are merged into a neighbor.
    /// Rounded, at least 1.
    pub min_region_size: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            color_count: 16.0,
            dither_mode: DitherMode::None,
            smoothing_amount: 0.3,
            simplify_amount: 0.2,
            min_region_size: 4.0,
        }
    }
}

impl ProcessingConfig {
    /// Create a configuration with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested color count.
    #[inline]
    pub fn color_count(mut self, count: u32) -> Self {
        self.color_count = count as f64;
        self
    }

    /// Set the smoothing amount.
    #[inline]
    pub fn smoothing(mut self, amount: f64) -> Self {
        self.smoothing_amount = amount;
        self
    }

    /// Set the simplify amount.
    #[inline]
    pub fn simplify(mut self, amount: f64) -> Self {
        self.simplify_amount = amount;
        self
    }

    /// Set the minimum region size.
    #[inline]
    pub fn min_region_size(mut self, pixels: u32) -> Self {
        self.min_region_size = pixels as f64;
        self
    }

    /// Set the dither mode.
    #[inline]
    pub fn dither(mut self, mode: DitherMode) -> Self {
        self.dither_mode = mode;
        self
    }

    /// Clamp and round every field into its valid range.
    ///
    /// Never fails: NaN amounts become 0, non-finite or non-positive counts
    /// become 1, and oversize counts saturate.
    pub fn normalized(&self) -> NormalizedConfig {
        NormalizedConfig {
            color_count: clamp_count(self.color_count, MAX_COLORS),
            dither_mode: self.dither_mode,
            smoothing_amount: clamp_unit(self.smoothing_amount),
            simplify_amount: clamp_unit(self.simplify_amount),
            min_region_size: clamp_count(self.min_region_size, u32::MAX as usize),
        }
    }
}

/// A [`ProcessingConfig`] after clamping, as the pipeline consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedConfig {
    pub color_count: usize,
    pub dither_mode: DitherMode,
    pub smoothing_amount: f32,
    pub simplify_amount: f32,
    pub min_region_size: usize,
}

impl NormalizedConfig {
    /// Number of bilateral passes for the smoothing amount.
    pub fn smoothing_passes(&self) -> usize {
        if self.smoothing_amount <= 0.0 {
            0
        } else if self.smoothing_amount < 0.5 {
            1
        } else {
            2
        }
    }

    /// Number of label smoothing passes.
    pub fn label_smoothing_passes(&self) -> usize {
        (self.simplify_amount * 2.0).round() as usize
    }

    /// Perceptual drift tolerated when label smoothing switches a pixel.
    pub fn allow_error(&self) -> f32 {
        0.010 * self.simplify_amount
    }
}

fn clamp_unit(value: f64) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0) as f32
    }
}

fn clamp_count(value: f64, max: usize) -> usize {
    if value.is_nan() || value == f64::NEG_INFINITY {
        return 1;
    }
    let rounded = value.round();
    if rounded < 1.0 {
        1
    } else if rounded >= max as f64 {
        max
    } else {
        rounded as usize
    }
}
