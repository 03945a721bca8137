//! Palette struct with precomputed color spaces and nearest-color matching.

use crate::color::{LinearRgb, Oklab, Srgb};

/// One palette color with all representations precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    /// Mean linear color of the pixels carrying this label.
    pub linear: LinearRgb,
    /// The same color encoded to 8-bit sRGB.
    pub srgb: Srgb,
    /// The same color in OKLab, used for matching and ordering.
    pub oklab: Oklab,
}

impl PaletteEntry {
    /// Build an entry from a linear color, precomputing sRGB and OKLab.
    pub fn from_linear(linear: LinearRgb) -> Self {
        Self {
            linear,
            srgb: Srgb::from(linear),
            oklab: Oklab::from(linear),
        }
    }

    /// Uppercase `#RRGGBB`.
    pub fn hex(&self) -> String {
        self.srgb.to_hex()
    }
}

/// An ordered list of palette colors.
///
/// After a quantization run the entries are sorted by non-decreasing OKLab
/// lightness and every label in the accompanying label map is `< len()`.
///
/// # Example
///
/// ```
/// use stitch_quant::{LinearRgb, Oklab, Palette, PaletteEntry};
///
/// let palette = Palette::new(vec![
///     PaletteEntry::from_linear(LinearRgb::new(0.0, 0.0, 0.0)),
///     PaletteEntry::from_linear(LinearRgb::new(1.0, 1.0, 1.0)),
/// ]);
/// assert_eq!(palette.nearest(Oklab::new(0.9, 0.0, 0.0)), 1);
/// assert_eq!(palette.hex_colors(), vec!["#000000", "#FFFFFF"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Wrap a list of entries. Order is preserved as given.
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    /// Number of colors in the palette.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette has no colors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if present.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PaletteEntry> {
        self.entries.get(index)
    }

    /// All entries in palette order.
    #[inline]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Hex strings in palette order.
    pub fn hex_colors(&self) -> Vec<String> {
        self.entries.iter().map(PaletteEntry::hex).collect()
    }

    /// OKLab coordinates flattened as `[L0, a0, b0, L1, a1, b1, ...]`.
    pub fn oklab_flat(&self) -> Vec<f32> {
        self.entries
            .iter()
            .flat_map(|e| [e.oklab.l, e.oklab.a, e.oklab.b])
            .collect()
    }

    /// Index of the perceptually nearest entry (weighted OKLab distance).
    ///
    /// Ties resolve to the lower index. Returns 0 for an empty palette.
    pub fn nearest(&self, color: Oklab) -> u16 {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for (i, entry) in self.entries.iter().enumerate() {
            let d = color.perceptual_distance_sq(entry.oklab);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best as u16
    }

    /// Labels whose color lies within `threshold` of the fabric color.
    ///
    /// `threshold` is a weighted OKLab distance (not squared). These labels
    /// are the ones excluded from stitching and flagged as fabric when
    /// extracting vector paths.
    pub fn fabric_labels(&self, fabric: Oklab, threshold: f32) -> Vec<u16> {
        let limit = threshold.max(0.0);
        let limit_sq = limit * limit;
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.oklab.perceptual_distance_sq(fabric) <= limit_sq)
            .map(|(i, _)| i as u16)
            .collect()
    }

    /// Whether entries are ordered by non-decreasing lightness.
    pub fn is_sorted_by_lightness(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].oklab.l <= w[1].oklab.l)
    }
}
