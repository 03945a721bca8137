//! Linear RGB color type
//!
//! Linear RGB is the color space where light addition is physically accurate.
//! Compositing, averaging and filtering are done here.

use super::lut::{linear_to_srgb8, srgb8_to_linear};
use super::srgb::Srgb;

/// A color in linear RGB color space.
///
/// Values are typically in the range 0.0..=1.0, but may leave it slightly
/// after an OKLab round trip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearRgb {
    /// Red channel (linear light intensity)
    pub r: f32,
    /// Green channel (linear light intensity)
    pub g: f32,
    /// Blue channel (linear light intensity)
    pub b: f32,
}

impl LinearRgb {
    /// Create a new LinearRgb color from linear RGB values.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode 8-bit sRGB channels through the lookup table.
    #[inline]
    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: srgb8_to_linear(rgb[0]),
            g: srgb8_to_linear(rgb[1]),
            b: srgb8_to_linear(rgb[2]),
        }
    }

    /// Decode an RGBA pixel and composite it over white.
    ///
    /// Compositing happens in linear light so that half-transparent dark
    /// pixels lighten the way the fabric would show through.
    #[inline]
    pub fn from_rgba8_over_white(rgba: [u8; 4]) -> Self {
        let alpha = rgba[3] as f32 / 255.0;
        let fg = Self::from_srgb8([rgba[0], rgba[1], rgba[2]]);
        Self {
            r: fg.r * alpha + (1.0 - alpha),
            g: fg.g * alpha + (1.0 - alpha),
            b: fg.b * alpha + (1.0 - alpha),
        }
    }

    /// Encode to 8-bit sRGB, clamping and rounding each channel.
    #[inline]
    pub fn to_srgb8(self) -> [u8; 3] {
        [
            linear_to_srgb8(self.r),
            linear_to_srgb8(self.g),
            linear_to_srgb8(self.b),
        ]
    }
}

impl From<Srgb> for LinearRgb {
    fn from(srgb: Srgb) -> Self {
        Self::from_srgb8(srgb.to_bytes())
    }
}
