//! 8-bit gamma conversion
//!
//! Decoding uses a 256-entry table generated at compile time by build.rs.
//! Encoding evaluates the exact inverse curve, since its input is continuous.

include!(concat!(env!("OUT_DIR"), "/srgb8_lut.rs"));

/// Convert an 8-bit sRGB channel value to linear light.
#[inline]
pub fn srgb8_to_linear(value: u8) -> f32 {
    SRGB8_TO_LINEAR[value as usize]
}

/// Convert a linear channel value to an 8-bit sRGB value.
///
/// Input outside `0.0..=1.0` (and NaN) is clamped before encoding; the result
/// is rounded to the nearest integer.
#[inline]
pub fn linear_to_srgb8(linear: f32) -> u8 {
    let linear = if linear.is_nan() {
        0.0
    } else {
        linear.clamp(0.0, 1.0)
    };
    let srgb = if linear <= 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    };
    (srgb * 255.0).round().clamp(0.0, 255.0) as u8
}
