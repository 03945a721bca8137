//! Color types and conversion utilities
//!
//! This module provides type-safe color handling with compile-time distinction
//! between sRGB, linear RGB and OKLab.
//!
//! # Color Spaces
//!
//! - **sRGB**: 8-bit gamma-encoded values as they arrive from image files and
//!   leave as hex strings. Use for I/O only.
//! - **LinearRgb**: Linear light intensity. Averaging, compositing and the
//!   bilateral filter operate here.
//! - **Oklab**: Perceptual space. Clustering, nearest-color lookups and fabric
//!   classification operate here, with the lightness channel weighted by
//!   [`LIGHTNESS_WEIGHT`].
//!
//! # Example
//!
//! ```
//! use stitch_quant::{LinearRgb, Oklab, Srgb};
//!
//! let srgb: Srgb = "#3366CC".parse().unwrap();
//! let linear = LinearRgb::from(srgb);
//! let lab = Oklab::from(linear);
//! assert_eq!(Srgb::from(LinearRgb::from(lab)).to_hex(), "#3366CC");
//! ```

mod linear_rgb;
mod lut;
mod oklab;
mod srgb;

pub use linear_rgb::LinearRgb;
pub use lut::{linear_to_srgb8, srgb8_to_linear};
pub use oklab::{Oklab, LIGHTNESS_WEIGHT};
pub use srgb::Srgb;
