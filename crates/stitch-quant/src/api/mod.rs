//! Crate-wide error type and buffer allocation.

mod buffer;
mod error;

pub(crate) use buffer::{alloc_filled, pixel_count};
pub use error::{QuantError, Result};
