//! Perceptual color quantization.
//!
//! [`quantize`] turns a [`NormalizedImage`] into a label map and a
//! lightness-sorted [`Palette`]:
//!
//! ```text
//! RGBA ──► composite over white ──► linear RGB + OKLab
//!      ──► bilateral smoothing (0-2 passes)
//!      ──► k-means on a strided subsample, full assignment
//!      ──► small-region elimination ──► label smoothing
//!      ──► recompact + lightness sort
//!      ──► [bayer: perturb L, reassign, recompact + sort]
//! ```
//!
//! Every call allocates its own buffers and reads nothing but its arguments,
//! so calls can run concurrently on any thread.

mod bayer;
mod cleanup;
mod compact;
mod image;
mod kmeans;
mod options;
mod smoothing;

pub use bayer::BAYER_STRENGTH;
pub use image::NormalizedImage;
pub use kmeans::{MAX_ITERATIONS, MAX_TRAINING_SAMPLES};
pub use options::{DitherMode, NormalizedConfig, ProcessingConfig, MAX_COLORS};

pub(crate) use cleanup::neighbors4;

use serde::Serialize;

use crate::api::{alloc_filled, QuantError, Result};
use crate::color::{LinearRgb, Oklab};
use crate::palette::Palette;
use crate::selection::SelectionMask;

/// Result of one quantization run.
///
/// `labels.len() == width * height` and every label is `< palette.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeResult {
    pub width: u32,
    pub height: u32,
    pub labels: Vec<u16>,
    pub palette: Palette,
}

/// Flat, serializable form of a [`QuantizeResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantizeOutput {
    pub width: u32,
    pub height: u32,
    pub labels: Vec<u16>,
    pub palette_hex: Vec<String>,
    pub palette_ok_lab: Vec<f32>,
}

impl QuantizeResult {
    /// Number of pixels carrying each palette label. Labels outside the
    /// palette are not counted.
    pub fn label_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.palette.len()];
        for &l in &self.labels {
            if let Some(count) = counts.get_mut(l as usize) {
                *count += 1;
            }
        }
        counts
    }

    /// Flatten into the hex / OKLab-triplet form used at the boundary.
    pub fn to_output(&self) -> QuantizeOutput {
        QuantizeOutput {
            width: self.width,
            height: self.height,
            labels: self.labels.clone(),
            palette_hex: self.palette.hex_colors(),
            palette_ok_lab: self.palette.oklab_flat(),
        }
    }
}

/// Quantize an image with every pixel participating in training.
///
/// # Example
///
/// ```
/// use stitch_quant::{quantize, NormalizedImage, ProcessingConfig};
///
/// let image = NormalizedImage::filled(8, 8, [200, 30, 30, 255]).unwrap();
/// let result = quantize(&image, &ProcessingConfig::new().color_count(5)).unwrap();
/// assert_eq!(result.palette.len(), 1);
/// assert_eq!(result.labels.len(), 64);
/// ```
pub fn quantize(image: &NormalizedImage, config: &ProcessingConfig) -> Result<QuantizeResult> {
    quantize_selection(image, config, None)
}

/// Quantize an image, training the palette only on selected pixels.
///
/// Every pixel is still labelled. When the selection is empty training falls
/// back to the whole image. A selection whose dimensions differ from the
/// image is rejected.
pub fn quantize_selection(
    image: &NormalizedImage,
    config: &ProcessingConfig,
    selection: Option<&SelectionMask>,
) -> Result<QuantizeResult> {
    let (width, height) = (image.width(), image.height());
    if let Some(mask) = selection {
        if mask.width() != width || mask.height() != height {
            return Err(QuantError::MaskDimensionMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                width,
                height,
            });
        }
    }

    let settings = config.normalized();
    let n = image.pixel_count();
    if n == 0 {
        return Ok(QuantizeResult {
            width,
            height,
            labels: Vec::new(),
            palette: Palette::default(),
        });
    }
    let (w, h) = (width as usize, height as usize);

    // 1. Composite and convert
    let mut linear = alloc_filled(n, LinearRgb::default())?;
    let mut lab = alloc_filled(n, Oklab::default())?;
    for i in 0..n {
        let c = LinearRgb::from_rgba8_over_white(image.pixel(i));
        linear[i] = c;
        lab[i] = Oklab::from(c);
    }

    // 2. Edge-preserving smoothing
    for _ in 0..settings.smoothing_passes() {
        smoothing::bilateral_pass(w, h, &mut linear, &mut lab, settings.smoothing_amount)?;
    }

    // 3. K-means
    let candidates: Vec<usize> = match selection {
        Some(mask) if mask.selected_count() > 0 => mask
            .data()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, _)| i)
            .collect(),
        _ => (0..n).collect(),
    };
    let samples = kmeans::subsample(&lab, &candidates);
    let (centers, iterations) = kmeans::train(&samples, settings.color_count);
    tracing::debug!(
        width,
        height,
        k = settings.color_count,
        centers = centers.len(),
        samples = samples.len(),
        iterations,
        "k-means trained"
    );

    let mut labels = alloc_filled(n, 0u16)?;
    for (label, color) in labels.iter_mut().zip(&lab) {
        *label = kmeans::nearest_center(&centers, *color).0 as u16;
    }

    // 4. Small-region elimination
    let merged =
        cleanup::remove_small_regions(&mut labels, w, h, &centers, settings.min_region_size)?;

    // 5. Label smoothing
    let switched = cleanup::smooth_labels(
        &mut labels,
        w,
        h,
        &lab,
        &centers,
        settings.label_smoothing_passes(),
        settings.allow_error(),
    )?;

    // 6-7. Recompact and sort
    let mut palette = compact::finalize(&mut labels, &linear, centers.len());

    // 8. Ordered dithering
    if settings.dither_mode == DitherMode::Bayer {
        bayer::apply(&mut labels, w, &lab, &palette);
        palette = compact::finalize(&mut labels, &linear, palette.len());
    }

    tracing::debug!(
        palette = palette.len(),
        merged,
        switched,
        dither = ?settings.dither_mode,
        "quantization finished"
    );

    Ok(QuantizeResult {
        width,
        height,
        labels,
        palette,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: u32, height: u32) -> NormalizedImage {
        let mut rgba = Vec::new();
        for _y in 0..height {
            for x in 0..width {
                if x < width / 2 {
                    rgba.extend_from_slice(&[20, 20, 160, 255]);
                } else {
                    rgba.extend_from_slice(&[240, 200, 40, 255]);
                }
            }
        }
        NormalizedImage::new(width, height, rgba).unwrap()
    }

    #[test]
    fn test_labels_cover_image_and_index_palette() {
        let image = two_tone(10, 6);
        let result = quantize(&image, &ProcessingConfig::default()).unwrap();
        assert_eq!(result.labels.len(), 60);
        assert_eq!(result.palette.len(), 2);
        assert!(result.labels.iter().all(|&l| (l as usize) < result.palette.len()));
        assert!(result.palette.is_sorted_by_lightness());
        // Blue half is darker, so it gets label 0
        assert_eq!(result.labels[0], 0);
        assert_eq!(result.labels[9], 1);
    }

    #[test]
    fn test_zero_sized_image() {
        let image = NormalizedImage::new(0, 5, Vec::new()).unwrap();
        let result = quantize(&image, &ProcessingConfig::default()).unwrap();
        assert!(result.labels.is_empty());
        assert!(result.palette.is_empty());
    }

    #[test]
    fn test_selection_dimension_mismatch_is_fatal() {
        let image = two_tone(4, 4);
        let mask = SelectionMask::all(4, 3).unwrap();
        let err =
            quantize_selection(&image, &ProcessingConfig::default(), Some(&mask)).unwrap_err();
        assert!(matches!(err, QuantError::MaskDimensionMismatch { .. }));
    }

    #[test]
    fn test_selection_restricts_training() {
        // Train only on the left (blue) half: one color survives.
        let image = two_tone(8, 4);
        let data: Vec<u8> = (0..32).map(|i| u8::from(i % 8 < 4)).collect();
        let mask = SelectionMask::new(8, 4, data).unwrap();
        let config = ProcessingConfig::new().color_count(4);
        let result = quantize_selection(&image, &config, Some(&mask)).unwrap();
        assert_eq!(result.palette.len(), 1);
    }

    #[test]
    fn test_output_shape() {
        let result = quantize(&two_tone(4, 2), &ProcessingConfig::default()).unwrap();
        let out = result.to_output();
        assert_eq!(out.palette_ok_lab.len(), out.palette_hex.len() * 3);
        assert_eq!(result.label_counts(), vec![4, 4]);
    }

    #[test]
    fn test_label_counts_skip_labels_outside_palette() {
        let mut result = quantize(&two_tone(4, 2), &ProcessingConfig::default()).unwrap();
        result.labels[3] = 7;
        assert_eq!(result.label_counts(), vec![4, 3]);

        let empty = QuantizeResult {
            width: 3,
            height: 1,
            labels: vec![0; 3],
            palette: crate::Palette::default(),
        };
        assert!(empty.label_counts().is_empty());
    }

    #[test]
    fn test_bayer_keeps_invariants() {
        let mut rgba = Vec::new();
        for i in 0..64u32 {
            let v = (i * 4) as u8;
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
        let image = NormalizedImage::new(8, 8, rgba).unwrap();
        let config = ProcessingConfig::new()
            .color_count(3)
            .dither(DitherMode::Bayer);
        let result = quantize(&image, &config).unwrap();
        assert!(result.palette.len() <= 3);
        assert!(result.palette.is_sorted_by_lightness());
        assert!(result.labels.iter().all(|&l| (l as usize) < result.palette.len()));
    }
}
