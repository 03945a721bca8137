//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use stitch_quant::{QuantizeResult, RegionGraph, StitchRaster};

/// Assert labels cover the image and index the palette, and the palette is
/// lightness-sorted
pub fn assert_valid_quantization(result: &QuantizeResult) {
    assert_eq!(
        result.labels.len(),
        (result.width * result.height) as usize,
        "Label map does not cover the image"
    );
    if let Some((i, l)) = result
        .labels
        .iter()
        .enumerate()
        .find(|(_, &l)| l as usize >= result.palette.len())
    {
        panic!(
            "Label {} at pixel {} is out of range for palette of {}",
            l,
            i,
            result.palette.len()
        );
    }
    assert!(
        result.palette.is_sorted_by_lightness(),
        "Palette is not sorted by lightness: {:?}",
        result.palette.hex_colors()
    );
}

/// Assert the structural invariants of a region graph built from `raster`
pub fn assert_consistent_graph(graph: &RegionGraph, raster: &StitchRaster) {
    let total: usize = graph.regions.iter().map(|r| r.area).sum();
    assert_eq!(total, raster.stitch_count(), "Region areas must sum to stitches");

    let n = graph.regions.len();
    assert_eq!(graph.adjacency.len(), n + 1);
    assert_eq!(graph.outline_segments_by_region_id.len(), n + 1);
    assert_eq!(graph.label_point_by_region_id.len(), n + 1);

    for (i, region) in graph.regions.iter().enumerate() {
        assert_eq!(region.id as usize, i + 1, "Region ids must be dense");
        for &other in graph.neighbors(region.id) {
            assert_ne!(other, region.id, "Region {} lists itself", region.id);
            assert!(
                graph.neighbors(other).contains(&region.id),
                "Adjacency {} -> {} is not symmetric",
                region.id,
                other
            );
        }
        let point = graph.label_point_by_region_id[region.id as usize]
            .unwrap_or_else(|| panic!("Region {} has no label point", region.id));
        assert_eq!(
            graph.region_at(point.x as u32, point.y as u32),
            Some(region.id),
            "Label point of region {} is outside it",
            region.id
        );
        assert_eq!(graph.outline(region.id).len() % 4, 0);
    }

    for (idx, &id) in graph.pixel_region_id.iter().enumerate() {
        let (x, y) = (idx as u32 % graph.width, idx as u32 / graph.width);
        let is_fabric = raster.color_at(x, y).map_or(true, |c| c.is_fabric());
        assert_eq!(id == 0, is_fabric, "Pixel ({x}, {y}) fabric/region mismatch");
    }
}
