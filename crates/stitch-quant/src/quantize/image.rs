use crate::api::{pixel_count, QuantError, Result};

/// An RGBA raster, row-major, 4 bytes per pixel.
///
/// This is the only image form the quantizer accepts. Decoding and resizing
/// happen before it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl NormalizedImage {
    /// Wrap an RGBA buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?
            .checked_mul(4)
            .ok_or(QuantError::InvalidDimensions { width, height })?;
        if rgba.len() != expected {
            return Err(QuantError::ImageLengthMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// An image where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let len = pixel_count(width, height)?
            .checked_mul(4)
            .ok_or(QuantError::InvalidDimensions { width, height })?;
        let mut buf = crate::api::alloc_filled(len, 0u8)?;
        for px in buf.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Self::new(width, height, buf)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.rgba.len() / 4
    }

    /// RGBA value at pixel index `i`.
    #[inline]
    pub(crate) fn pixel(&self, i: usize) -> [u8; 4] {
        let o = i * 4;
        [
            self.rgba[o],
            self.rgba[o + 1],
            self.rgba[o + 2],
            self.rgba[o + 3],
        ]
    }
}
