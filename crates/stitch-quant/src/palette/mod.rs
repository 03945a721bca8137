//! Palette types and utilities
//!
//! A [`Palette`] is the ordered color table produced by quantization. Label
//! maps index into it; fabric classification is done against it.

mod error;
mod palette;

pub use error::ParseColorError;
pub use palette::{Palette, PaletteEntry};
