use serde::{Deserialize, Serialize};

use crate::api::{alloc_filled, Result};
use crate::quantize::neighbors4;

use super::mask::SelectionMask;

/// Cleanup applied to a freshly edited mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefinementParams {
    /// Selected components smaller than this are cleared.
    pub min_island_area: usize,
    /// Enclosed unselected components smaller than this are filled.
    /// Components touching the border are never filled.
    pub hole_fill_area: usize,
    /// 3×3 majority passes over interior pixels.
    pub smoothing_passes: usize,
}

impl Default for RefinementParams {
    fn default() -> Self {
        Self {
            min_island_area: 16,
            hole_fill_area: 16,
            smoothing_passes: 1,
        }
    }
}

/// Remove small islands, fill small holes, then majority-smooth.
///
/// Returns a new mask; the input is not modified.
pub fn refine_mask(mask: &SelectionMask, params: &RefinementParams) -> Result<SelectionMask> {
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let mut data = mask.data().to_vec();

    if params.min_island_area > 0 {
        flip_small_components(&mut data, w, h, 1, params.min_island_area, false)?;
    }
    if params.hole_fill_area > 0 {
        flip_small_components(&mut data, w, h, 0, params.hole_fill_area, true)?;
    }

    if w >= 3 && h >= 3 {
        for _ in 0..params.smoothing_passes {
            let src = data.clone();
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    let mut count = 0;
                    for ny in y - 1..=y + 1 {
                        for nx in x - 1..=x + 1 {
                            count += src[ny * w + nx] as usize;
                        }
                    }
                    data[y * w + x] = u8::from(count >= 5);
                }
            }
        }
    }

    SelectionMask::new(mask.width(), mask.height(), data)
}

/// Flip every 4-connected component of `value` smaller than `limit` to the
/// other value. With `interior_only`, components touching the border are kept.
fn flip_small_components(
    data: &mut [u8],
    width: usize,
    height: usize,
    value: u8,
    limit: usize,
    interior_only: bool,
) -> Result<()> {
    let mut visited = alloc_filled(data.len(), false)?;
    let mut stack = Vec::new();
    let mut component = Vec::new();

    for start in 0..data.len() {
        if visited[start] || data[start] != value {
            continue;
        }
        component.clear();
        stack.push(start);
        visited[start] = true;
        let mut touches_edge = false;

        while let Some(idx) = stack.pop() {
            component.push(idx);
            let (x, y) = (idx % width, idx / width);
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                touches_edge = true;
            }
            for n in neighbors4(idx, width, height).into_iter().flatten() {
                if !visited[n] && data[n] == value {
                    visited[n] = true;
                    stack.push(n);
                }
            }
        }

        if component.len() < limit && !(interior_only && touches_edge) {
            for &idx in &component {
                data[idx] = 1 - value;
            }
        }
    }
    Ok(())
}
