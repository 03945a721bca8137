//! stitch-quant: perceptual color quantization and region segmentation
//! for cross-stitch patterns.
//!
//! # Quick Start
//!
//! ```
//! use stitch_quant::{quantize, NormalizedImage, ProcessingConfig};
//!
//! // 2x1 image: one red pixel, one blue pixel
//! let image = NormalizedImage::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
//! let config = ProcessingConfig::default()
//!     .color_count(2)
//!     .smoothing(0.0)
//!     .min_region_size(1);
//!
//! let result = quantize(&image, &config).unwrap();
//! assert_eq!(result.palette.len(), 2);
//! assert_eq!(result.labels.len(), 2);
//! ```
//!
//! # Components
//!
//! - [`color`]: sRGB, linear RGB and OKLab with a lightness-weighted distance.
//! - [`quantize`](mod@quantize): image to label map plus lightness-sorted palette.
//! - [`selection`]: binary masks, resampling between resolutions, hoops.
//! - [`regions`]: stitch rasters and the region graph (regions, adjacency,
//!   outlines, label anchors) keyed by a content hash.
//! - [`vector`]: closed polygon paths per label.
//!
//! # Data Flow
//!
//! ```text
//! RGBA image ──► quantize ──► labels + Palette
//!                                │
//!          ┌─────────────────────┼──────────────────────┐
//!          v                     v                      v
//!   StitchRaster::from_quantized            extract_paths
//!          │                                      │
//!          v                                      v
//!   RegionGraphBuilder::build              Vec<VectorPath>
//!          │
//!          v
//!     RegionGraph (keyed by LockHash)
//!
//! SelectionMask ──► resample_mask_nearest ──► any stage above
//! ```
//!
//! Every entry point is a synchronous function of its arguments. Nothing is
//! cached or shared inside this crate; caching by [`LockHash`] belongs to the
//! caller.

pub mod api;
pub mod color;
pub mod palette;
pub mod quantize;
pub mod regions;
pub mod selection;
pub mod vector;

#[cfg(test)]
mod domain_tests;

pub use api::{QuantError, Result};
pub use color::{LinearRgb, Oklab, Srgb, LIGHTNESS_WEIGHT};
pub use palette::{Palette, PaletteEntry, ParseColorError};
pub use quantize::{
    quantize, quantize_selection, DitherMode, NormalizedConfig, NormalizedImage, ProcessingConfig,
    QuantizeOutput, QuantizeResult,
};
pub use regions::{
    lock_hash, BBox, LabelPoint, LegendEntry, LockHash, Region, RegionGraph, RegionGraphBuilder,
    StitchColor, StitchRaster, FABRIC_CODE,
};
pub use selection::{
    hoop_mask, refine_mask, resample_mask_nearest, HoopConfig, HoopShape, RefinementParams,
    Selection, SelectionMask,
};
pub use vector::{extract_paths, PathOptions, Point, VectorPath};
