use crate::api::{alloc_filled, pixel_count, QuantError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    /// Sample at the source position under each target pixel's center.
    Center,
    /// Sample at the source position under each target pixel's top-left.
    Origin,
}

/// Nearest-neighbor resize of a binary mask.
///
/// Downsampling (neither axis grows) samples under target pixel centers,
/// anything else samples under target pixel origins. If a center-aligned
/// downsample of a mask with at least one selected pixel comes out empty, it
/// is redone origin-aligned. Should that also miss every selected pixel, each
/// selected source pixel marks the target pixel it falls in, so a non-empty
/// mask never resamples to an empty one. Same-size input is returned
/// unchanged.
///
/// Output values are 0 or 1.
///
/// # Errors
///
/// [`QuantError::MaskLengthMismatch`] if `mask.len() != src_w * src_h`, and
/// [`QuantError::InvalidDimensions`] when a non-empty target is requested
/// from an empty source.
///
/// # Example
///
/// ```
/// use stitch_quant::resample_mask_nearest;
///
/// #[rustfmt::skip]
/// let quadrants = [
///     1, 1, 0, 0,
///     1, 1, 0, 0,
///     0, 0, 1, 1,
///     0, 0, 1, 1,
/// ];
/// let small = resample_mask_nearest(&quadrants, 4, 4, 2, 2).unwrap();
/// assert_eq!(small, vec![1, 0, 0, 1]);
/// ```
pub fn resample_mask_nearest(
    mask: &[u8],
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
) -> Result<Vec<u8>> {
    let expected = pixel_count(src_w, src_h)?;
    if mask.len() != expected {
        return Err(QuantError::MaskLengthMismatch {
            expected,
            actual: mask.len(),
        });
    }

    let dst_len = pixel_count(dst_w, dst_h)?;
    if dst_len == 0 {
        return Ok(Vec::new());
    }
    if expected == 0 {
        return Err(QuantError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }

    let selected = mask.iter().any(|&v| v != 0);
    let downsampling = dst_w <= src_w && dst_h <= src_h;
    let mut out = if downsampling {
        sample(mask, src_w, src_h, dst_w, dst_h, Alignment::Center)?
    } else {
        sample(mask, src_w, src_h, dst_w, dst_h, Alignment::Origin)?
    };
    if !selected || out.iter().any(|&v| v != 0) {
        return Ok(out);
    }

    if downsampling {
        tracing::trace!(
            src_w,
            src_h,
            dst_w,
            dst_h,
            "sparse mask vanished, resampling origin-aligned"
        );
        out = sample(mask, src_w, src_h, dst_w, dst_h, Alignment::Origin)?;
        if out.iter().any(|&v| v != 0) {
            return Ok(out);
        }
    }

    tracing::trace!(
        src_w,
        src_h,
        dst_w,
        dst_h,
        "sampling missed every selected pixel, scattering"
    );
    scatter(mask, src_w, src_h, dst_w, dst_h, &mut out);
    Ok(out)
}

/// Mark the target pixel containing each selected source pixel.
fn scatter(mask: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, out: &mut [u8]) {
    let (src_w, src_h, dst_w, dst_h) = (src_w as u64, src_h as u64, dst_w as u64, dst_h as u64);
    for (idx, &v) in mask.iter().enumerate() {
        if v == 0 {
            continue;
        }
        let (sx, sy) = (idx as u64 % src_w, idx as u64 / src_w);
        let tx = (sx * dst_w / src_w).min(dst_w - 1);
        let ty = (sy * dst_h / src_h).min(dst_h - 1);
        out[(ty * dst_w + tx) as usize] = 1;
    }
}

fn sample(
    mask: &[u8],
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
    alignment: Alignment,
) -> Result<Vec<u8>> {
    let xs: Vec<usize> = (0..dst_w)
        .map(|x| source_coord(x, src_w, dst_w, alignment))
        .collect();
    let mut out = alloc_filled(dst_w as usize * dst_h as usize, 0u8)?;
    for y in 0..dst_h {
        let sy = source_coord(y, src_h, dst_h, alignment);
        let src_row = sy * src_w as usize;
        let dst_row = y as usize * dst_w as usize;
        for (x, &sx) in xs.iter().enumerate() {
            out[dst_row + x] = u8::from(mask[src_row + sx] != 0);
        }
    }
    Ok(out)
}

/// Integer nearest-neighbor source coordinate, clamped to the source.
#[inline]
fn source_coord(dst: u32, src_len: u32, dst_len: u32, alignment: Alignment) -> usize {
    let (dst, src_len, dst_len) = (dst as u64, src_len as u64, dst_len as u64);
    let s = match alignment {
        Alignment::Center => ((2 * dst + 1) * src_len) / (2 * dst_len),
        Alignment::Origin => (dst * src_len) / dst_len,
    };
    s.min(src_len - 1) as usize
}
