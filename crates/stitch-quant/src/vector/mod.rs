//! Closed polygon paths from a label map.
//!
//! [`extract_paths`] traces every 4-connected run of one label, turns its
//! pixel boundary into rings, then simplifies and rounds them. Labels in the
//! excluded set are still traced and come back flagged as fabric.

mod simplify;
mod trace;

use serde::Serialize;

use crate::api::{pixel_count, QuantError, Result};
use crate::selection::SelectionMask;

/// A vertex in grid coordinates. Pixel `(x, y)` covers `[x, x+1) x [y, y+1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One closed ring. The first vertex is not repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorPath {
    pub label: u16,
    pub points: Vec<Point>,
    pub is_fabric: bool,
    /// Counter-clockwise ring bounding a hole in its component.
    pub is_hole: bool,
    /// Signed shoelace area after simplification; negative for holes.
    pub area: f32,
}

/// Tracing options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOptions<'a> {
    /// Simplification tolerance in pixels. `0` keeps every corner.
    pub simplify: f32,
    /// Number of corner-rounding passes.
    pub smooth: usize,
    /// Pixels outside this mask are treated as absent.
    pub manual_mask: Option<&'a SelectionMask>,
}

impl<'a> PathOptions<'a> {
    pub fn new(simplify: f32, smooth: usize) -> Self {
        Self {
            simplify,
            smooth,
            manual_mask: None,
        }
    }

    pub fn with_mask(mut self, mask: &'a SelectionMask) -> Self {
        self.manual_mask = Some(mask);
        self
    }
}

/// Trace closed paths for every same-label region.
///
/// Paths come back ordered by the first pixel of their component, and
/// within a component outer ring first (largest absolute area first).
///
/// # Errors
///
/// Fails when `labels` does not hold `width * height` entries, when a label
/// is `>= palette_len`, or when the manual mask has other dimensions.
///
/// # Example
///
/// ```
/// use stitch_quant::{extract_paths, PathOptions};
///
/// let labels = [0, 0, 1, 1];
/// let paths = extract_paths(&labels, 4, 1, 2, &[1], &PathOptions::new(0.0, 0)).unwrap();
/// assert_eq!(paths.len(), 2);
/// assert!(!paths[0].is_fabric);
/// assert!(paths[1].is_fabric);
/// ```
pub fn extract_paths(
    labels: &[u16],
    width: u32,
    height: u32,
    palette_len: usize,
    excluded: &[u16],
    options: &PathOptions<'_>,
) -> Result<Vec<VectorPath>> {
    let n = pixel_count(width, height)?;
    if labels.len() != n {
        return Err(QuantError::LabelLengthMismatch {
            expected: n,
            actual: labels.len(),
        });
    }
    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|(_, &l)| l as usize >= palette_len)
    {
        return Err(QuantError::LabelOutOfRange {
            index,
            label,
            palette_len,
        });
    }
    let present: Vec<bool> = match options.manual_mask {
        Some(mask) => {
            mask.ensure_dimensions(width, height)?;
            mask.data().iter().map(|&v| v != 0).collect()
        }
        None => vec![true; n],
    };

    let components = trace::trace_components(labels, &present, width as usize, height as usize)?;
    let epsilon = if options.simplify.is_finite() {
        options.simplify.max(0.0)
    } else {
        0.0
    };

    let mut paths = Vec::new();
    for component in components {
        let is_fabric = excluded.contains(&component.label);
        let mut rings: Vec<VectorPath> = component
            .loops
            .iter()
            .map(|raw| {
                let corners = simplify::collapse_collinear(raw);
                let grid: Vec<Point> = corners
                    .iter()
                    .map(|&(x, y)| Point::new(x as f32, y as f32))
                    .collect();
                let is_hole = simplify::signed_area(&grid) < 0.0;
                let mut points = simplify::simplify_closed(&grid, epsilon);
                for _ in 0..options.smooth {
                    points = simplify::chaikin_closed(&points);
                }
                let area = simplify::signed_area(&points);
                VectorPath {
                    label: component.label,
                    points,
                    is_fabric,
                    is_hole,
                    area,
                }
            })
            .collect();
        rings.sort_by(|a, b| b.area.abs().total_cmp(&a.area.abs()));
        paths.extend(rings);
    }

    tracing::debug!(
        paths = paths.len(),
        simplify = epsilon,
        smooth = options.smooth,
        "extracted vector paths"
    );
    Ok(paths)
}
