//! Edge-preserving 3×3 bilateral filter.
//!
//! Each neighbor's weight is the product of a spatial Gaussian (sigma = 1
//! pixel) and a color Gaussian in OKLab with separate widths for lightness
//! and chroma. Averaging happens in linear RGB; OKLab is recomputed from the
//! result so the next pass (and clustering) see the filtered colors.

use crate::api::{alloc_filled, Result};
use crate::color::{LinearRgb, Oklab};

const SIGMA_L_MIN: f32 = 0.010;
const SIGMA_L_MAX: f32 = 0.060;
const SIGMA_C_MIN: f32 = 0.010;
const SIGMA_C_MAX: f32 = 0.090;

/// Color-similarity widths for a smoothing amount in `[0, 1]`.
pub(crate) fn sigmas(amount: f32) -> (f32, f32) {
    let t = amount.clamp(0.0, 1.0);
    (
        SIGMA_L_MIN + (SIGMA_L_MAX - SIGMA_L_MIN) * t,
        SIGMA_C_MIN + (SIGMA_C_MAX - SIGMA_C_MIN) * t,
    )
}

/// Run one filter pass, replacing both buffers.
pub(crate) fn bilateral_pass(
    width: usize,
    height: usize,
    linear: &mut Vec<LinearRgb>,
    lab: &mut Vec<Oklab>,
    amount: f32,
) -> Result<()> {
    let (sigma_l, sigma_c) = sigmas(amount);
    let inv_l = 1.0 / (2.0 * sigma_l * sigma_l);
    let inv_c = 1.0 / (2.0 * sigma_c * sigma_c);
    let spatial = [1.0f32, (-0.5f32).exp(), (-1.0f32).exp()];

    let mut out_linear = alloc_filled(linear.len(), LinearRgb::default())?;
    let mut out_lab = alloc_filled(lab.len(), Oklab::default())?;

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let center = lab[i];
            let mut sum = [0.0f32; 3];
            let mut total = 0.0f32;

            for dy in -1i32..=1 {
                let ny = y as i32 + dy;
                if ny < 0 || ny >= height as i32 {
                    continue;
                }
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    if nx < 0 || nx >= width as i32 {
                        continue;
                    }
                    let j = ny as usize * width + nx as usize;
                    let other = lab[j];
                    let dl = other.l - center.l;
                    let da = other.a - center.a;
                    let db = other.b - center.b;
                    let color_w = (-(dl * dl * inv_l + (da * da + db * db) * inv_c)).exp();
                    let w = spatial[(dx.abs() + dy.abs()) as usize] * color_w;
                    let c = linear[j];
                    sum[0] += c.r * w;
                    sum[1] += c.g * w;
                    sum[2] += c.b * w;
                    total += w;
                }
            }

            // The center always contributes weight 1, so total >= 1.
            let filtered = LinearRgb::new(sum[0] / total, sum[1] / total, sum[2] / total);
            out_linear[i] = filtered;
            out_lab[i] = Oklab::from(filtered);
        }
    }

    *linear = out_linear;
    *lab = out_lab;
    Ok(())
}
