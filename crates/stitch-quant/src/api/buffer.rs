use super::error::{QuantError, Result};

/// `width * height` as a buffer length, rejecting overflow.
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(QuantError::InvalidDimensions { width, height })
}

/// Allocate a working buffer, reporting failure instead of aborting.
pub(crate) fn alloc_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| QuantError::Allocation { elements: len })?;
    buf.resize(len, value);
    Ok(buf)
}
