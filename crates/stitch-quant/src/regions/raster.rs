use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::{pixel_count, QuantError, Result};
use crate::color::Srgb;
use crate::quantize::QuantizeResult;
use crate::selection::SelectionMask;

/// Color code carried by background pixels.
pub const FABRIC_CODE: &str = "Fabric";

/// Normalized `CODE|HEX` key identifying a stitch color.
pub fn color_key(code: &str, hex: &str) -> String {
    format!(
        "{}|{}",
        code.trim().to_ascii_uppercase(),
        hex.trim().to_ascii_uppercase()
    )
}

/// Whether a color code denotes the fabric background.
pub fn is_fabric_code(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(FABRIC_CODE)
}

/// A thread color as it appears in a stitch raster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StitchColor {
    pub code: String,
    pub hex: String,
}

impl StitchColor {
    pub fn new(code: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            hex: hex.into(),
        }
    }

    /// The fabric sentinel with the given background color.
    pub fn fabric(hex: impl Into<String>) -> Self {
        Self::new(FABRIC_CODE, hex)
    }

    pub fn key(&self) -> String {
        color_key(&self.code, &self.hex)
    }

    pub fn is_fabric(&self) -> bool {
        is_fabric_code(&self.code)
    }
}

/// One line of a pattern legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub color: StitchColor,
    pub stitch_count: usize,
    /// Share of all non-fabric stitches, in `[0, 1]`.
    pub coverage: f64,
}

/// Per-pixel stitch colors, stored as indices into a color table.
///
/// The table layout is an implementation detail: only the color each pixel
/// resolves to matters for region building and fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchRaster {
    width: u32,
    height: u32,
    colors: Vec<StitchColor>,
    cells: Vec<u32>,
}

impl StitchRaster {
    /// Build from a color table and per-pixel indices into it.
    pub fn new(width: u32, height: u32, colors: Vec<StitchColor>, cells: Vec<u32>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if cells.len() != expected {
            return Err(QuantError::RasterLengthMismatch {
                expected,
                actual: cells.len(),
            });
        }
        if let Some((index, &color)) = cells
            .iter()
            .enumerate()
            .find(|(_, &c)| c as usize >= colors.len())
        {
            return Err(QuantError::ColorIndexOutOfRange {
                index,
                color,
                colors: colors.len(),
            });
        }
        Ok(Self {
            width,
            height,
            colors,
            cells,
        })
    }

    /// Build from one color per pixel in row-major order, interning
    /// identical colors.
    pub fn from_colors(
        width: u32,
        height: u32,
        pixels: impl IntoIterator<Item = StitchColor>,
    ) -> Result<Self> {
        let mut table: Vec<StitchColor> = Vec::new();
        let mut index: HashMap<StitchColor, u32> = HashMap::new();
        let mut cells = Vec::new();
        for color in pixels {
            let next = table.len() as u32;
            let id = *index.entry(color.clone()).or_insert_with(|| {
                table.push(color);
                next
            });
            cells.push(id);
        }
        Self::new(width, height, table, cells)
    }

    /// Turn a quantization result into stitches.
    ///
    /// Palette label `i` becomes code `RAW-{i+1}` with the palette hex.
    /// Pixels whose label is in `fabric_labels`, or that fall outside
    /// `selection`, become the fabric sentinel with color `fabric`.
    pub fn from_quantized(
        result: &QuantizeResult,
        fabric_labels: &[u16],
        selection: Option<&SelectionMask>,
        fabric: Srgb,
    ) -> Result<Self> {
        if let Some(mask) = selection {
            mask.ensure_dimensions(result.width, result.height)?;
        }
        let palette_len = result.palette.len();
        let expected = pixel_count(result.width, result.height)?;
        if result.labels.len() != expected {
            return Err(QuantError::LabelLengthMismatch {
                expected,
                actual: result.labels.len(),
            });
        }

        let mut colors: Vec<StitchColor> = result
            .palette
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| StitchColor::new(format!("RAW-{}", i + 1), e.hex()))
            .collect();
        let fabric_index = colors.len() as u32;
        colors.push(StitchColor::fabric(fabric.to_hex()));

        let mut is_fabric = vec![false; palette_len];
        for &l in fabric_labels {
            if let Some(slot) = is_fabric.get_mut(l as usize) {
                *slot = true;
            }
        }

        let mut cells = Vec::with_capacity(expected);
        for (i, &label) in result.labels.iter().enumerate() {
            if label as usize >= palette_len {
                return Err(QuantError::LabelOutOfRange {
                    index: i,
                    label,
                    palette_len,
                });
            }
            let selected = selection.map_or(true, |m| m.data()[i] != 0);
            cells.push(if selected && !is_fabric[label as usize] {
                label as u32
            } else {
                fabric_index
            });
        }
        Self::new(result.width, result.height, colors, cells)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The color table.
    #[inline]
    pub fn colors(&self) -> &[StitchColor] {
        &self.colors
    }

    /// Per-pixel indices into [`colors`](Self::colors).
    #[inline]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Color of pixel `(x, y)`.
    pub fn color_at(&self, x: u32, y: u32) -> Option<&StitchColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cell = self.cells[y as usize * self.width as usize + x as usize];
        self.colors.get(cell as usize)
    }

    /// Number of pixels that are not fabric.
    pub fn stitch_count(&self) -> usize {
        let fabric: Vec<bool> = self.colors.iter().map(StitchColor::is_fabric).collect();
        self.cells.iter().filter(|&&c| !fabric[c as usize]).count()
    }

    /// Non-fabric colors with their stitch counts, most used first.
    ///
    /// Colors with equal keys are merged. Ties on count order by key.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut per_table = vec![0usize; self.colors.len()];
        for &c in &self.cells {
            per_table[c as usize] += 1;
        }

        let mut by_key: HashMap<String, (StitchColor, usize)> = HashMap::new();
        for (color, count) in self.colors.iter().zip(per_table) {
            if color.is_fabric() || count == 0 {
                continue;
            }
            by_key
                .entry(color.key())
                .or_insert_with(|| (color.clone(), 0))
                .1 += count;
        }

        let total: usize = by_key.values().map(|(_, n)| n).sum();
        let mut entries: Vec<(String, LegendEntry)> = by_key
            .into_iter()
            .map(|(key, (color, stitch_count))| {
                let coverage = if total == 0 {
                    0.0
                } else {
                    stitch_count as f64 / total as f64
                };
                (
                    key,
                    LegendEntry {
                        color,
                        stitch_count,
                        coverage,
                    },
                )
            })
            .collect();
        entries.sort_by(|a, b| b.1.stitch_count.cmp(&a.1.stitch_count).then(a.0.cmp(&b.0)));
        entries.into_iter().map(|(_, e)| e).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::LinearRgb;
    use crate::palette::{Palette, PaletteEntry};

    fn result() -> QuantizeResult {
        QuantizeResult {
            width: 2,
            height: 2,
            labels: vec![0, 1, 1, 2],
            palette: Palette::new(vec![
                PaletteEntry::from_linear(LinearRgb::new(0.0, 0.0, 0.0)),
                PaletteEntry::from_linear(LinearRgb::new(1.0, 0.0, 0.0)),
                PaletteEntry::from_linear(LinearRgb::new(1.0, 1.0, 1.0)),
            ]),
        }
    }

    #[test]
    fn test_color_key_normalizes() {
        assert_eq!(color_key(" raw-1 ", "#ff00aa"), "RAW-1|#FF00AA");
        assert!(is_fabric_code("FABRIC"));
        assert!(is_fabric_code("fabric"));
        assert!(!is_fabric_code("RAW-1"));
    }

    #[test]
    fn test_from_quantized_codes_and_fabric() {
        let white = Srgb::from_u8(255, 255, 255);
        let raster = StitchRaster::from_quantized(&result(), &[2], None, white).unwrap();
        assert_eq!(raster.color_at(0, 0).unwrap().code, "RAW-1");
        assert_eq!(raster.color_at(1, 0).unwrap().hex, "#FF0000");
        assert!(raster.color_at(1, 1).unwrap().is_fabric());
        assert_eq!(raster.stitch_count(), 3);
    }

    #[test]
    fn test_from_quantized_respects_selection() {
        let mask = SelectionMask::new(2, 2, vec![1, 0, 1, 1]).unwrap();
        let white = Srgb::from_u8(255, 255, 255);
        let raster = StitchRaster::from_quantized(&result(), &[], Some(&mask), white).unwrap();
        assert!(raster.color_at(1, 0).unwrap().is_fabric());
        assert_eq!(raster.stitch_count(), 3);

        let wrong = SelectionMask::all(3, 2).unwrap();
        assert!(StitchRaster::from_quantized(&result(), &[], Some(&wrong), white).is_err());
    }

    #[test]
    fn test_new_validates() {
        let colors = vec![StitchColor::new("A", "#000")];
        let err = StitchRaster::new(2, 1, colors, vec![0, 3]).unwrap_err();
        assert_eq!(
            err,
            QuantError::ColorIndexOutOfRange {
                index: 1,
                color: 3,
                colors: 1
            }
        );
        assert!(StitchRaster::new(2, 2, vec![], vec![]).is_err());
    }

    #[test]
    fn test_legend_orders_by_count() {
        let white = Srgb::from_u8(255, 255, 255);
        let legend = StitchRaster::from_quantized(&result(), &[], None, white)
            .unwrap()
            .legend();
        assert_eq!(legend.len(), 3);
        assert_eq!(legend[0].color.code, "RAW-2");
        assert_eq!(legend[0].stitch_count, 2);
        assert_eq!(legend[1].color.code, "RAW-1");
        assert!((legend[0].coverage - 0.5).abs() < 1e-12);
    }
}
