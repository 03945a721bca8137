//! Palette recompaction and lightness ordering.

use crate::color::LinearRgb;
use crate::palette::{Palette, PaletteEntry};

/// Rebuild the palette from final membership.
///
/// Each used label's color becomes the mean linear color of its pixels.
/// Unused labels are dropped and the survivors renumbered contiguously in
/// their original order.
pub(crate) fn recompact(labels: &mut [u16], linear: &[LinearRgb], label_count: usize) -> Palette {
    let mut sums = vec![[0.0f64; 3]; label_count];
    let mut counts = vec![0usize; label_count];
    for (&l, c) in labels.iter().zip(linear) {
        let s = &mut sums[l as usize];
        s[0] += c.r as f64;
        s[1] += c.g as f64;
        s[2] += c.b as f64;
        counts[l as usize] += 1;
    }

    let mut remap = vec![0u16; label_count];
    let mut entries = Vec::new();
    for (old, (sum, &count)) in sums.iter().zip(&counts).enumerate() {
        if count == 0 {
            continue;
        }
        remap[old] = entries.len() as u16;
        let n = count as f64;
        entries.push(PaletteEntry::from_linear(LinearRgb::new(
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        )));
    }

    for l in labels.iter_mut() {
        *l = remap[*l as usize];
    }
    Palette::new(entries)
}

/// Reorder the palette by ascending OKLab lightness and remap labels to
/// match. Equal lightness keeps the previous relative order.
pub(crate) fn sort_by_lightness(labels: &mut [u16], palette: Palette) -> Palette {
    let entries = palette.entries();
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| {
        entries[a]
            .oklab
            .l
            .total_cmp(&entries[b].oklab.l)
            .then(a.cmp(&b))
    });

    let mut remap = vec![0u16; entries.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new as u16;
    }
    for l in labels.iter_mut() {
        *l = remap[*l as usize];
    }
    Palette::new(order.iter().map(|&old| entries[old]).collect())
}

/// [`recompact`] followed by [`sort_by_lightness`].
pub(crate) fn finalize(labels: &mut [u16], linear: &[LinearRgb], label_count: usize) -> Palette {
    let palette = recompact(labels, linear, label_count);
    sort_by_lightness(labels, palette)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_labels_are_dropped() {
        let mut labels = vec![0, 3, 3, 0];
        let linear = vec![
            LinearRgb::new(0.0, 0.0, 0.0),
            LinearRgb::new(1.0, 1.0, 1.0),
            LinearRgb::new(0.5, 0.5, 0.5),
            LinearRgb::new(0.2, 0.2, 0.2),
        ];
        let palette = recompact(&mut labels, &linear, 5);
        assert_eq!(palette.len(), 2);
        assert_eq!(labels, vec![0, 1, 1, 0]);
        assert!((palette.entries()[1].linear.r - 0.75).abs() < 1e-6);
        assert!((palette.entries()[0].linear.r - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_sort_remaps_labels_with_palette() {
        let mut labels = vec![0, 1, 2, 1];
        let linear = vec![
            LinearRgb::new(1.0, 1.0, 1.0),
            LinearRgb::new(0.0, 0.0, 0.0),
            LinearRgb::new(0.3, 0.3, 0.3),
            LinearRgb::new(0.0, 0.0, 0.0),
        ];
        let palette = finalize(&mut labels, &linear, 3);
        assert!(palette.is_sorted_by_lightness());
        assert_eq!(palette.hex_colors()[0], "#000000");
        assert_eq!(palette.hex_colors()[2], "#FFFFFF");
        // Every pixel still carries its own color.
        for (l, c) in labels.iter().zip(&linear) {
            assert_eq!(palette.entries()[*l as usize].linear, *c);
        }
    }
}
