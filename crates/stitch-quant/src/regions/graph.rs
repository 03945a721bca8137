//! Region graph construction.
//!
//! Regions are 4-connected runs of one stitch color. Fabric pixels belong to
//! no region. IDs come from a canonical sort rather than discovery order, so
//! an unchanged raster always yields the same numbering.

use std::collections::HashMap;

use serde::Serialize;

use crate::api::{alloc_filled, Result};
use crate::quantize::neighbors4;

use super::lock_hash::{lock_hash, LockHash};
use super::raster::{StitchColor, StitchRaster};

/// Inclusive pixel bounds of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// One connected run of a single color.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// 1-based, dense.
    pub id: u32,
    pub color_index: usize,
    pub color_key: String,
    pub bbox: BBox,
    pub area: usize,
}

/// Where a region's label is drawn: the center of one of its own pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPoint {
    pub x: f32,
    pub y: f32,
}

/// Connected components of a stitch raster with adjacency and outlines.
///
/// Per-region vectors (`adjacency`, `outline_segments_by_region_id`,
/// `label_point_by_region_id`) are indexed by region id and have an unused
/// slot 0. Segments are flat `x0, y0, x1, y1` quads of unit length on the
/// pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionGraph {
    pub lock_hash: LockHash,
    pub width: u32,
    pub height: u32,
    /// Stitch colors by color index.
    pub colors: Vec<StitchColor>,
    /// Regions in id order (`regions[i].id == i + 1`).
    pub regions: Vec<Region>,
    /// Region id per pixel, 0 for fabric.
    pub pixel_region_id: Vec<u32>,
    /// Region ids per color index, ascending.
    pub regions_by_color: Vec<Vec<u32>>,
    /// Sorted, deduplicated neighbor ids per region id.
    pub adjacency: Vec<Vec<u32>>,
    pub all_boundary_segments: Vec<u32>,
    pub outline_segments_by_region_id: Vec<Option<Vec<u32>>>,
    pub label_point_by_region_id: Vec<Option<LabelPoint>>,
}

impl RegionGraph {
    /// Region by id.
    pub fn region(&self, id: u32) -> Option<&Region> {
        id.checked_sub(1)
            .and_then(|i| self.regions.get(i as usize))
    }

    /// Region id under pixel `(x, y)`, if it is not fabric.
    pub fn region_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        match self.pixel_region_id[y as usize * self.width as usize + x as usize] {
            0 => None,
            id => Some(id),
        }
    }

    /// Neighbor ids of a region.
    pub fn neighbors(&self, id: u32) -> &[u32] {
        self.adjacency
            .get(id as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Boundary segments of one region.
    pub fn outline(&self, id: u32) -> &[u32] {
        self.outline_segments_by_region_id
            .get(id as usize)
            .and_then(Option::as_deref)
            .unwrap_or(&[])
    }
}

struct Discovered {
    color_index: usize,
    bbox: BBox,
    area: usize,
    first_pixel: usize,
    sum_x: f64,
    sum_y: f64,
}

/// Builder for [`RegionGraph`].
///
/// # Example
///
/// ```
/// use stitch_quant::{RegionGraphBuilder, StitchColor, StitchRaster};
///
/// let red = StitchColor::new("RAW-1", "#FF0000");
/// let fabric = StitchColor::fabric("#FFFFFF");
/// let raster = StitchRaster::from_colors(
///     3,
///     1,
///     vec![red.clone(), fabric, red],
/// )
/// .unwrap();
///
/// let graph = RegionGraphBuilder::new().build(&raster).unwrap();
/// assert_eq!(graph.regions.len(), 2);
/// assert_eq!(graph.region_at(1, 0), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegionGraphBuilder<'a> {
    legend: Option<&'a [StitchColor]>,
    selection_id: &'a str,
}

impl<'a> RegionGraphBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preferred color order. Listed colors take the lowest color indices in
    /// the given order, whether or not they occur in the raster.
    pub fn legend(mut self, legend: &'a [StitchColor]) -> Self {
        self.legend = Some(legend);
        self
    }

    /// Selection identity mixed into the lock hash.
    pub fn selection_id(mut self, id: &'a str) -> Self {
        self.selection_id = id;
        self
    }

    /// Compute the graph.
    pub fn build(&self, raster: &StitchRaster) -> Result<RegionGraph> {
        let width = raster.width() as usize;
        let height = raster.height() as usize;
        let n = width * height;

        // Color indexing: legend first, then first-seen raster order.
        let mut index_by_key: HashMap<String, usize> = HashMap::new();
        let mut colors: Vec<StitchColor> = Vec::new();
        let mut intern = |color: &StitchColor| -> usize {
            *index_by_key.entry(color.key()).or_insert_with(|| {
                colors.push(color.clone());
                colors.len() - 1
            })
        };
        for color in self.legend.unwrap_or(&[]) {
            if !color.is_fabric() {
                intern(color);
            }
        }
        let table = raster.colors();
        let mut table_index: Vec<Option<usize>> = vec![None; table.len()];
        let mut table_seen = vec![false; table.len()];
        for &cell in raster.cells() {
            let c = cell as usize;
            if !table_seen[c] {
                table_seen[c] = true;
                if !table[c].is_fabric() {
                    table_index[c] = Some(intern(&table[c]));
                }
            }
        }
        let pixel_color: Vec<Option<usize>> = raster
            .cells()
            .iter()
            .map(|&c| table_index[c as usize])
            .collect();

        // Discovery
        let mut discovery = alloc_filled(n, 0u32)?;
        let mut found: Vec<Discovered> = Vec::new();
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        for start in 0..n {
            let Some(color_index) = pixel_color[start] else {
                continue;
            };
            if discovery[start] != 0 {
                continue;
            }
            let tag = found.len() as u32 + 1;
            let mut region = Discovered {
                color_index,
                bbox: BBox {
                    x0: u32::MAX,
                    y0: u32::MAX,
                    x1: 0,
                    y1: 0,
                },
                area: 0,
                first_pixel: start,
                sum_x: 0.0,
                sum_y: 0.0,
            };
            discovery[start] = tag;
            stack.push(start);
            while let Some(idx) = stack.pop() {
                let (x, y) = ((idx % width) as u32, (idx / width) as u32);
                region.area += 1;
                region.sum_x += x as f64;
                region.sum_y += y as f64;
                region.bbox.x0 = region.bbox.x0.min(x);
                region.bbox.y0 = region.bbox.y0.min(y);
                region.bbox.x1 = region.bbox.x1.max(x);
                region.bbox.y1 = region.bbox.y1.max(y);
                for nb in neighbors4(idx, width, height).into_iter().flatten() {
                    if discovery[nb] == 0 && pixel_color[nb] == Some(color_index) {
                        discovery[nb] = tag;
                        stack.push(nb);
                    }
                }
            }
            found.push(region);
        }

        // Canonical ids
        let mut order: Vec<usize> = (0..found.len()).collect();
        order.sort_by(|&a, &b| {
            let (ra, rb) = (&found[a], &found[b]);
            ra.color_index
                .cmp(&rb.color_index)
                .then(rb.area.cmp(&ra.area))
                .then(ra.bbox.y0.cmp(&rb.bbox.y0))
                .then(ra.bbox.x0.cmp(&rb.bbox.x0))
                .then(ra.first_pixel.cmp(&rb.first_pixel))
        });
        let mut id_of_tag = vec![0u32; found.len() + 1];
        for (rank, &d) in order.iter().enumerate() {
            id_of_tag[d + 1] = rank as u32 + 1;
        }
        let mut pixel_region_id = discovery;
        for id in pixel_region_id.iter_mut() {
            *id = id_of_tag[*id as usize];
        }

        let region_count = found.len();
        let mut regions = Vec::with_capacity(region_count);
        let mut regions_by_color: Vec<Vec<u32>> = vec![Vec::new(); colors.len()];
        for (rank, &d) in order.iter().enumerate() {
            let r = &found[d];
            let id = rank as u32 + 1;
            regions.push(Region {
                id,
                color_index: r.color_index,
                color_key: colors[r.color_index].key(),
                bbox: r.bbox,
                area: r.area,
            });
            regions_by_color[r.color_index].push(id);
        }

        // Adjacency and boundaries in one right/below pass
        let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); region_count + 1];
        let mut outlines: Vec<Vec<u32>> = vec![Vec::new(); region_count + 1];
        let mut all_segments: Vec<u32> = Vec::new();
        let mut emit = |seg: [u32; 4], a: u32, b: u32| {
            all_segments.extend_from_slice(&seg);
            if a != 0 {
                outlines[a as usize].extend_from_slice(&seg);
            }
            if b != 0 {
                outlines[b as usize].extend_from_slice(&seg);
            }
        };
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let r = pixel_region_id[i];
                let (xu, yu) = (x as u32, y as u32);

                if r != 0 && x == 0 {
                    emit([0, yu, 0, yu + 1], r, 0);
                }
                if r != 0 && y == 0 {
                    emit([xu, 0, xu + 1, 0], r, 0);
                }

                let right = if x + 1 < width { pixel_region_id[i + 1] } else { 0 };
                if r != right {
                    emit([xu + 1, yu, xu + 1, yu + 1], r, right);
                    if r != 0 && right != 0 {
                        adjacency[r as usize].push(right);
                        adjacency[right as usize].push(r);
                    }
                }

                let below = if y + 1 < height { pixel_region_id[i + width] } else { 0 };
                if r != below {
                    emit([xu, yu + 1, xu + 1, yu + 1], r, below);
                    if r != 0 && below != 0 {
                        adjacency[r as usize].push(below);
                        adjacency[below as usize].push(r);
                    }
                }
            }
        }
        for list in adjacency.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }

        // Label anchors: member pixel nearest the centroid
        let centroids: Vec<(f64, f64)> = std::iter::once((0.0, 0.0))
            .chain(order.iter().map(|&d| {
                let r = &found[d];
                let area = r.area.max(1) as f64;
                (r.sum_x / area + 0.5, r.sum_y / area + 0.5)
            }))
            .collect();
        let mut best: Vec<Option<(f64, usize)>> = vec![None; region_count + 1];
        for (i, &id) in pixel_region_id.iter().enumerate() {
            if id == 0 {
                continue;
            }
            let (cx, cy) = centroids[id as usize];
            let px = (i % width) as f64 + 0.5;
            let py = (i / width) as f64 + 0.5;
            let d = (px - cx) * (px - cx) + (py - cy) * (py - cy);
            let slot = &mut best[id as usize];
            if slot.map_or(true, |(bd, _)| d < bd) {
                *slot = Some((d, i));
            }
        }
        let mut label_point_by_region_id: Vec<Option<LabelPoint>> = vec![None; region_count + 1];
        for (rank, &d) in order.iter().enumerate() {
            let id = rank + 1;
            let pixel = best[id].map_or(found[d].first_pixel, |(_, i)| i);
            label_point_by_region_id[id] = Some(LabelPoint {
                x: (pixel % width) as f32 + 0.5,
                y: (pixel / width) as f32 + 0.5,
            });
        }

        let mut outline_segments_by_region_id: Vec<Option<Vec<u32>>> =
            outlines.into_iter().map(Some).collect();
        outline_segments_by_region_id[0] = None;

        let lock_hash = lock_hash(raster, self.selection_id);
        tracing::debug!(
            width,
            height,
            regions = region_count,
            colors = colors.len(),
            %lock_hash,
            "region graph built"
        );

        Ok(RegionGraph {
            lock_hash,
            width: raster.width(),
            height: raster.height(),
            colors,
            regions,
            pixel_region_id,
            regions_by_color,
            adjacency,
            all_boundary_segments: all_segments,
            outline_segments_by_region_id,
            label_point_by_region_id,
        })
    }
}
