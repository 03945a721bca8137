//! Test fixtures: images, PNG files, config files and random rasters.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use stitch_quant::{NormalizedImage, StitchColor, StitchRaster};

/// Named RGBA colors used across tests
pub mod colors {
    pub const RED: [u8; 4] = [210, 30, 40, 255];
    pub const BLUE: [u8; 4] = [25, 50, 200, 255];
    pub const GREEN: [u8; 4] = [40, 180, 60, 255];
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const CREAM: [u8; 4] = [245, 240, 225, 255];
}

/// Image split into four quadrants: top-left, top-right, bottom-left,
/// bottom-right
pub fn quadrant_image(width: u32, height: u32, quads: [[u8; 4]; 4]) -> NormalizedImage {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let q = (y >= height / 2) as usize * 2 + (x >= width / 2) as usize;
            rgba.extend_from_slice(&quads[q]);
        }
    }
    NormalizedImage::new(width, height, rgba).unwrap()
}

/// Noisy image from a fixed seed
pub fn random_image(seed: u64, width: u32, height: u32) -> NormalizedImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let rgba = (0..width * height)
        .flat_map(|_| [rng.gen(), rng.gen(), rng.gen(), 255u8])
        .collect();
    NormalizedImage::new(width, height, rgba).unwrap()
}

/// Random raster over a few colors plus fabric, from a fixed seed
pub fn random_raster(seed: u64, width: u32, height: u32, color_count: usize) -> StitchRaster {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut colors: Vec<StitchColor> = (0..color_count)
        .map(|i| StitchColor::new(format!("DMC-{}", 300 + i), format!("#{:02X}3366", i * 20)))
        .collect();
    colors.push(StitchColor::fabric("#FFFFFF"));
    let cells = (0..width * height)
        .map(|_| rng.gen_range(0..colors.len() as u32))
        .collect();
    StitchRaster::new(width, height, colors, cells).unwrap()
}

/// Random binary mask with roughly `density` selected pixels
pub fn random_mask(seed: u64, len: usize, density: f64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_bool(density) as u8).collect()
}

/// Encode RGBA8 pixels as PNG bytes
pub fn encode_png(image: &NormalizedImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(image.rgba()).unwrap();
    }
    buf.into_inner()
}

/// Write an image as PNG into `dir`
pub fn write_png(dir: &Path, name: &str, image: &NormalizedImage) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode_png(image)).unwrap();
    path
}

/// Write a YAML config into `dir`
pub fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("stitchgrid.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}
