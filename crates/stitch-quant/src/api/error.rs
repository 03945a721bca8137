//! Unified error type for the stitch-quant public API.
//!
//! Numeric configuration is clamped rather than rejected, so every variant
//! here is either a contract violation by the caller (mismatched lengths or
//! dimensions) or a resource failure. Neither is ever papered over with a
//! default result.

use crate::palette::ParseColorError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, QuantError>;

/// Unified error type for the stitch-quant public API.
///
/// # Example
///
/// ```
/// use stitch_quant::{resample_mask_nearest, QuantError};
///
/// let err = resample_mask_nearest(&[1, 0, 1], 2, 2, 1, 1).unwrap_err();
/// assert!(matches!(err, QuantError::MaskLengthMismatch { expected: 4, actual: 3 }));
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantError {
    /// Image buffer length does not match `width * height * 4`.
    #[error("image buffer has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    ImageLengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Mask buffer length does not match its declared dimensions.
    #[error("mask has {actual} values, expected {expected}")]
    MaskLengthMismatch { expected: usize, actual: usize },

    /// Mask dimensions do not match the raster it is combined with.
    #[error("mask is {mask_width}x{mask_height} but target raster is {width}x{height}")]
    MaskDimensionMismatch {
        mask_width: u32,
        mask_height: u32,
        width: u32,
        height: u32,
    },

    /// Label map length does not match `width * height`.
    #[error("label map has {actual} entries, expected {expected}")]
    LabelLengthMismatch { expected: usize, actual: usize },

    /// A label refers past the end of the palette.
    #[error("label {label} at pixel {index} is out of range for a palette of {palette_len}")]
    LabelOutOfRange {
        index: usize,
        label: u16,
        palette_len: usize,
    },

    /// Stitch raster cell count does not match `width * height`.
    #[error("stitch raster has {actual} cells, expected {expected}")]
    RasterLengthMismatch { expected: usize, actual: usize },

    /// A stitch raster cell refers past the end of its color table.
    #[error("cell {index} refers to color {color} but only {colors} colors are defined")]
    ColorIndexOutOfRange {
        index: usize,
        color: u32,
        colors: usize,
    },

    /// `width * height` overflows or a dimension is otherwise unusable.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A working buffer could not be allocated.
    #[error("failed to allocate working buffer of {elements} elements")]
    Allocation { elements: usize },

    /// Invalid hex color string.
    #[error("invalid color: {0}")]
    ParseColor(#[from] ParseColorError),
}
