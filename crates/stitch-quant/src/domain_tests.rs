//! Domain-critical regression tests for stitch-quant.
//!
//! These tests exercise whole pipelines rather than single stages. Each test
//! documents the regression it guards against.

#[cfg(test)]
mod domain_tests {
    use crate::color::{LinearRgb, Oklab, Srgb};
    use crate::quantize::{
        quantize, quantize_selection, DitherMode, NormalizedImage, ProcessingConfig,
    };
    use crate::regions::{lock_hash, RegionGraphBuilder, StitchRaster};
    use crate::selection::{resample_mask_nearest, SelectionMask};
    use crate::vector::{extract_paths, PathOptions};

    const BLUE: [u8; 4] = [20, 40, 220, 255];
    const RED: [u8; 4] = [220, 30, 30, 255];
    const GREEN: [u8; 4] = [30, 200, 40, 255];
    const YELLOW: [u8; 4] = [240, 220, 20, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// Image split into four equal quadrants: top-left, top-right,
    /// bottom-left, bottom-right.
    fn quadrants(size: u32, colors: [[u8; 4]; 4]) -> NormalizedImage {
        let half = size / 2;
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let q = (y >= half) as usize * 2 + (x >= half) as usize;
                rgba.extend_from_slice(&colors[q]);
            }
        }
        NormalizedImage::new(size, size, rgba).unwrap()
    }

    /// Smooth two-axis gradient with enough distinct colors to fill any
    /// palette size.
    fn gradient(width: u32, height: u32) -> NormalizedImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                let b = ((x + y) * 97 % 256) as u8;
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
        NormalizedImage::new(width, height, rgba).unwrap()
    }

    fn white_oklab() -> Oklab {
        Oklab::from(LinearRgb::from(Srgb::from_u8(255, 255, 255)))
    }

    // ========================================================================
    // GAP 1: Saturated quadrants keep their hue
    // ========================================================================

    /// If this breaks, it means: the palette is being averaged in the wrong
    /// space or clusters are collapsing, so strongly saturated quadrants come
    /// back as greys or as the `{0, 128}` channel values of a broken encode.
    #[test]
    fn test_quadrant_colors_survive_quantization() {
        let image = quadrants(4, [BLUE, RED, GREEN, YELLOW]);
        let result = quantize(&image, &ProcessingConfig::new().color_count(4)).unwrap();
        let srgb: Vec<Srgb> = result.palette.entries().iter().map(|e| e.srgb).collect();

        assert!(
            srgb.len() >= 3,
            "REGRESSION: four saturated quadrants produced only {} palette entries",
            srgb.len()
        );
        assert!(
            srgb.iter().any(|c| c.b >= 120 && c.b > c.r && c.b > c.g),
            "REGRESSION: no blue-dominant entry in {:?}",
            srgb
        );
        assert!(
            srgb.iter().any(|c| c.r >= 120 && c.r > c.g && c.r > c.b),
            "REGRESSION: no red-dominant entry in {:?}",
            srgb
        );
        assert!(
            srgb.iter().any(|c| c.g >= 120 && c.g > c.r && c.g > c.b),
            "REGRESSION: no green-dominant entry in {:?}",
            srgb
        );
        let collapsed = srgb
            .iter()
            .all(|c| [c.r, c.g, c.b].iter().all(|&v| v == 0 || v == 128));
        assert!(!collapsed, "REGRESSION: channels collapsed to {{0,128}}: {:?}", srgb);
    }

    // ========================================================================
    // GAP 2: Degenerate inputs shrink the palette instead of failing
    // ========================================================================

    /// If this breaks, it means: k-means is seeding duplicate centers on a
    /// single-color image, or recompaction keeps empty labels around.
    #[test]
    fn test_uniform_image_collapses_to_one_entry() {
        let image = NormalizedImage::filled(12, 9, [90, 140, 60, 255]).unwrap();
        for count in [1, 4, 16, 200] {
            for dither in [DitherMode::None, DitherMode::Bayer] {
                let config = ProcessingConfig::new()
                    .color_count(count)
                    .smoothing(1.0)
                    .dither(dither);
                let result = quantize(&image, &config).unwrap();
                assert_eq!(
                    result.palette.len(),
                    1,
                    "REGRESSION: uniform image with color_count={count} dither={dither:?} \
                     gave {} entries",
                    result.palette.len()
                );
                assert!(result.labels.iter().all(|&l| l == 0));
            }
        }
    }

    /// If this breaks, it means: fully transparent pixels are not being
    /// composited over white before conversion.
    #[test]
    fn test_transparent_image_is_white() {
        let image = NormalizedImage::filled(5, 5, [12, 200, 7, 0]).unwrap();
        let result = quantize(&image, &ProcessingConfig::new().color_count(3)).unwrap();
        assert_eq!(result.palette.len(), 1);
        assert_eq!(result.palette.entries()[0].hex(), "#FFFFFF");
    }

    // ========================================================================
    // GAP 3: Output invariants hold for every config
    // ========================================================================

    /// If this breaks, it means: some stage (dithering, smoothing, or
    /// recompaction) leaves labels pointing past the palette, or the final
    /// lightness sort is skipped on one of the paths.
    #[test]
    fn test_labels_in_range_and_palette_sorted() {
        let image = gradient(23, 17);
        for dither in [DitherMode::None, DitherMode::Bayer] {
            for (count, smoothing, simplify, min_region) in
                [(2, 0.0, 0.0, 1), (6, 0.3, 0.5, 3), (12, 0.8, 1.0, 8), (40, 1.0, 0.2, 1)]
            {
                let config = ProcessingConfig::new()
                    .color_count(count)
                    .smoothing(smoothing)
                    .simplify(simplify)
                    .min_region_size(min_region)
                    .dither(dither);
                let result = quantize(&image, &config).unwrap();
                assert_eq!(result.labels.len(), 23 * 17);
                assert!(
                    result
                        .labels
                        .iter()
                        .all(|&l| (l as usize) < result.palette.len()),
                    "REGRESSION: label out of range for {config:?}"
                );
                assert!(
                    result.palette.is_sorted_by_lightness(),
                    "REGRESSION: palette not sorted by L for {config:?}"
                );
                assert!(result.palette.len() <= count as usize);
                assert!(result.label_counts().iter().all(|&c| c > 0));
            }
        }
    }

    /// If this breaks, it means: small-region elimination is inventing
    /// labels instead of merging into existing neighbors.
    #[test]
    fn test_small_region_elimination_never_grows_palette() {
        let image = gradient(20, 20);
        let base = ProcessingConfig::new().color_count(10).simplify(0.0);
        let kept = quantize(&image, &base.clone().min_region_size(1)).unwrap();
        let merged = quantize(&image, &base.min_region_size(25)).unwrap();
        assert!(
            merged.palette.len() <= kept.palette.len(),
            "REGRESSION: min_region_size=25 produced {} entries, more than {} without merging",
            merged.palette.len(),
            kept.palette.len()
        );
    }

    /// If this breaks, it means: training on a selection also restricts
    /// which pixels get labels, or the empty-selection fallback is missing.
    #[test]
    fn test_selection_trains_palette_but_labels_everything() {
        let image = quadrants(8, [BLUE, RED, GREEN, YELLOW]);
        let mut data = vec![0u8; 64];
        for y in 0..4 {
            for x in 0..4 {
                data[y * 8 + x] = 1;
            }
        }
        let mask = SelectionMask::new(8, 8, data).unwrap();
        let config = ProcessingConfig::new().color_count(4);

        let result = quantize_selection(&image, &config, Some(&mask)).unwrap();
        assert_eq!(result.labels.len(), 64);
        assert_eq!(
            result.palette.len(),
            1,
            "REGRESSION: only the blue quadrant was selected, palette should be blue alone"
        );

        let empty = SelectionMask::new(8, 8, vec![0; 64]).unwrap();
        let fallback = quantize_selection(&image, &config, Some(&empty)).unwrap();
        assert_eq!(fallback, quantize(&image, &config).unwrap());
    }

    // ========================================================================
    // GAP 4: Mask resampling
    // ========================================================================

    /// If this breaks, it means: the center/origin alignment choice between
    /// downsampling and upsampling has been swapped or lost.
    #[test]
    fn test_quadrant_mask_round_trip() {
        #[rustfmt::skip]
        let mask = [
            1, 1, 0, 0,
            1, 1, 0, 0,
            0, 0, 1, 1,
            0, 0, 1, 1,
        ];
        let small = resample_mask_nearest(&mask, 4, 4, 2, 2).unwrap();
        assert_eq!(small, vec![1, 0, 0, 1]);
        let big = resample_mask_nearest(&small, 2, 2, 4, 4).unwrap();
        assert_eq!(big, mask.to_vec());
    }

    /// If this breaks, it means: the origin-aligned fallback no longer runs
    /// and sparse selections vanish on downsampling.
    #[test]
    fn test_sparse_mask_does_not_vanish() {
        #[rustfmt::skip]
        let mask = [
            1, 0, 1, 0,
            0, 0, 0, 0,
            1, 0, 1, 0,
            0, 0, 0, 0,
        ];
        let small = resample_mask_nearest(&mask, 4, 4, 2, 2).unwrap();
        assert_eq!(small, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_same_size_resample_is_identity() {
        let mask: Vec<u8> = (0..35).map(|i| (i % 3 == 0) as u8).collect();
        assert_eq!(resample_mask_nearest(&mask, 7, 5, 7, 5).unwrap(), mask);
    }

    // ========================================================================
    // GAP 5: Quantize -> regions -> paths
    // ========================================================================

    /// If this breaks, it means: fabric classification, region discovery and
    /// the stitch raster disagree about which pixels are stitched, which
    /// would make legends and outlines count different things.
    #[test]
    fn test_region_graph_from_quantized_image() {
        let image = quadrants(6, [BLUE, RED, GREEN, WHITE]);
        let result = quantize(&image, &ProcessingConfig::new().color_count(4)).unwrap();
        let fabric = result.palette.fabric_labels(white_oklab(), 0.06);
        assert_eq!(fabric.len(), 1, "REGRESSION: white quadrant not classified as fabric");

        let raster =
            StitchRaster::from_quantized(&result, &fabric, None, Srgb::from_u8(255, 255, 255))
                .unwrap();
        assert_eq!(raster.stitch_count(), 27);

        let graph = RegionGraphBuilder::new()
            .selection_id("all:6x6")
            .build(&raster)
            .unwrap();
        assert_eq!(graph.regions.len(), 3);
        let total: usize = graph.regions.iter().map(|r| r.area).sum();
        assert_eq!(total, raster.stitch_count());

        for region in &graph.regions {
            for &other in graph.neighbors(region.id) {
                assert!(
                    graph.neighbors(other).contains(&region.id),
                    "REGRESSION: adjacency {} -> {} is not symmetric",
                    region.id,
                    other
                );
            }
            let point = graph.label_point_by_region_id[region.id as usize]
                .expect("every region has a label point");
            assert_eq!(
                graph.region_at(point.x as u32, point.y as u32),
                Some(region.id),
                "REGRESSION: label point of region {} lies outside it",
                region.id
            );
        }

        // Fabric is never a region
        assert_eq!(graph.region_at(5, 5), None);
        assert_eq!(graph.lock_hash, lock_hash(&raster, "all:6x6"));
    }

    /// If this breaks, it means: the lock hash depends on something other
    /// than the raster content and the selection identity, so caches either
    /// miss on identical input or serve stale graphs.
    #[test]
    fn test_lock_hash_is_content_addressed() {
        let image = quadrants(4, [BLUE, RED, GREEN, YELLOW]);
        let config = ProcessingConfig::new().color_count(4);
        let white = Srgb::from_u8(255, 255, 255);
        let a = StitchRaster::from_quantized(&quantize(&image, &config).unwrap(), &[], None, white)
            .unwrap();
        let b = StitchRaster::from_quantized(&quantize(&image, &config).unwrap(), &[], None, white)
            .unwrap();
        assert_eq!(lock_hash(&a, "sel"), lock_hash(&b, "sel"));
        assert_ne!(lock_hash(&a, "sel"), lock_hash(&a, "other"));

        let mut mask = vec![1u8; 16];
        mask[0] = 0;
        let mask = SelectionMask::new(4, 4, mask).unwrap();
        let c = StitchRaster::from_quantized(
            &quantize(&image, &config).unwrap(),
            &[],
            Some(&mask),
            white,
        )
        .unwrap();
        assert_ne!(lock_hash(&a, "sel"), lock_hash(&c, "sel"));
    }

    /// If this breaks, it means: path extraction and fabric classification
    /// disagree, so a renderer would fill the background as thread.
    #[test]
    fn test_paths_flag_fabric_quadrant() {
        let image = quadrants(6, [BLUE, RED, GREEN, WHITE]);
        let result = quantize(&image, &ProcessingConfig::new().color_count(4)).unwrap();
        let fabric = result.palette.fabric_labels(white_oklab(), 0.06);
        let paths = extract_paths(
            &result.labels,
            6,
            6,
            result.palette.len(),
            &fabric,
            &PathOptions::new(0.6, 1),
        )
        .unwrap();

        assert_eq!(paths.len(), 4);
        assert_eq!(paths.iter().filter(|p| p.is_fabric).count(), 1);
        assert!(paths.iter().all(|p| !p.is_hole && p.area > 0.0));
        // Bottom-right quadrant starts last in raster order
        assert!(paths[3].is_fabric);
    }
}
