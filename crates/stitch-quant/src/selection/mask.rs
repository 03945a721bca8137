use std::borrow::Cow;

use crate::api::{alloc_filled, pixel_count, QuantError, Result};
use crate::regions::LockHasher;

use super::resample::resample_mask_nearest;

/// A `{0, 1}` mask with its own dimensions.
///
/// The length always equals `width * height`; any nonzero input value is
/// stored as 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SelectionMask {
    /// Wrap mask data, rejecting a length that disagrees with the dimensions.
    pub fn new(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if data.len() != expected {
            return Err(QuantError::MaskLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        for v in data.iter_mut() {
            *v = u8::from(*v != 0);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Every pixel selected.
    pub fn all(width: u32, height: u32) -> Result<Self> {
        let data = alloc_filled(pixel_count(width, height)?, 1u8)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether pixel `(x, y)` is selected. Out-of-bounds reads as unselected.
    #[inline]
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.data[y as usize * self.width as usize + x as usize] != 0
    }

    /// Number of selected pixels.
    pub fn selected_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Consume the mask, returning its data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Fail unless this mask has exactly the given dimensions.
    pub fn ensure_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if self.width != width || self.height != height {
            return Err(QuantError::MaskDimensionMismatch {
                mask_width: self.width,
                mask_height: self.height,
                width,
                height,
            });
        }
        Ok(())
    }
}

/// A selection as the editor holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The default select-all that nobody has edited yet.
    All { width: u32, height: u32 },
    /// An explicit, edited mask.
    Mask(SelectionMask),
}

impl Selection {
    /// The unedited default for a raster.
    pub fn select_all(width: u32, height: u32) -> Self {
        Selection::All { width, height }
    }

    pub fn width(&self) -> u32 {
        match self {
            Selection::All { width, .. } => *width,
            Selection::Mask(m) => m.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Selection::All { height, .. } => *height,
            Selection::Mask(m) => m.height(),
        }
    }

    /// Whether this is still the unedited select-all.
    pub fn is_default(&self) -> bool {
        matches!(self, Selection::All { .. })
    }

    /// The selection as a mask, materializing select-all if needed.
    pub fn mask(&self) -> Result<Cow<'_, SelectionMask>> {
        match self {
            Selection::All { width, height } => {
                Ok(Cow::Owned(SelectionMask::all(*width, *height)?))
            }
            Selection::Mask(m) => Ok(Cow::Borrowed(m)),
        }
    }

    /// Resample to a target raster size.
    ///
    /// The unedited select-all stays a select-all of the new size; an edited
    /// mask goes through [`resample_mask_nearest`].
    pub fn resample_to(&self, width: u32, height: u32) -> Result<Selection> {
        match self {
            Selection::All { .. } => Ok(Selection::select_all(width, height)),
            Selection::Mask(m) => {
                let data =
                    resample_mask_nearest(m.data(), m.width(), m.height(), width, height)?;
                Ok(Selection::Mask(SelectionMask::new(width, height, data)?))
            }
        }
    }

    /// Stable identity string used when fingerprinting rasters.
    ///
    /// Two selections with the same dimensions and mask content share an
    /// identity; the default select-all is `all:{w}x{h}`.
    pub fn identity(&self) -> String {
        match self {
            Selection::All { width, height } => format!("all:{width}x{height}"),
            Selection::Mask(m) => {
                let mut hasher = LockHasher::new();
                hasher.write(m.data());
                format!("mask:{}x{}:{}", m.width(), m.height(), hasher.finish())
            }
        }
    }
}
