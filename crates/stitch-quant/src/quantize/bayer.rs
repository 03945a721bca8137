//! 4×4 ordered dithering on the lightness channel.

use crate::color::Oklab;
use crate::palette::Palette;

/// Classic 4×4 Bayer threshold matrix, values 0..=15.
pub(crate) const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Peak-to-peak lightness perturbation.
pub const BAYER_STRENGTH: f32 = 0.012;

/// Lightness offset applied at pixel `(x, y)`.
#[inline]
pub(crate) fn offset(x: usize, y: usize) -> f32 {
    let t = BAYER_4X4[y % 4][x % 4] as f32;
    (t / 15.0 - 0.5) * BAYER_STRENGTH
}

/// Re-assign every pixel to the nearest palette entry after perturbing its
/// lightness by the Bayer offset.
pub(crate) fn apply(labels: &mut [u16], width: usize, lab: &[Oklab], palette: &Palette) {
    for (i, (label, color)) in labels.iter_mut().zip(lab).enumerate() {
        let (x, y) = (i % width, i / width);
        let perturbed = Oklab::new(color.l + offset(x, y), color.a, color.b);
        *label = palette.nearest(perturbed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::LinearRgb;
    use crate::palette::PaletteEntry;

    #[test]
    fn test_matrix_is_a_permutation() {
        let mut seen = [false; 16];
        for row in BAYER_4X4 {
            for v in row {
                seen[v as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_offset_range() {
        assert!((offset(0, 0) + 0.006).abs() < 1e-7);
        assert!((offset(0, 3) - 0.006).abs() < 1e-7);
        assert_eq!(offset(4, 4), offset(0, 0));
    }

    #[test]
    fn test_midpoint_color_alternates() {
        let dark = PaletteEntry::from_linear(LinearRgb::new(0.20, 0.20, 0.20));
        let light = PaletteEntry::from_linear(LinearRgb::new(0.21, 0.21, 0.21));
        let palette = Palette::new(vec![dark, light]);
        let mid = Oklab::new((dark.oklab.l + light.oklab.l) / 2.0, 0.0, 0.0);

        let mut labels = vec![0u16; 16];
        apply(&mut labels, 4, &[mid; 16], &palette);
        assert!(labels.contains(&0) && labels.contains(&1), "{labels:?}");
    }
}
