//! Binary selection masks.
//!
//! - [`resample_mask_nearest`] reconciles a mask with a raster of another
//!   resolution without letting sparse selections vanish.
//! - [`Selection`] distinguishes the untouched select-all default from an
//!   edited mask, so the common case resamples without touching a buffer.
//! - [`refine_mask`] and [`hoop_mask`] produce masks from edits and hoop
//!   outlines.

mod hoop;
mod mask;
mod refine;
mod resample;

pub use hoop::{hoop_mask, HoopConfig, HoopShape};
pub use mask::{Selection, SelectionMask};
pub use refine::{refine_mask, RefinementParams};
pub use resample::resample_mask_nearest;
