use serde::{Deserialize, Serialize};

use crate::api::{alloc_filled, pixel_count, Result};

use super::mask::SelectionMask;

/// Outline of the embroidery hoop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoopShape {
    #[default]
    Circle,
    Square,
    Oval,
}

/// Hoop placement in pixel coordinates of the target raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoopConfig {
    pub shape: HoopShape,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation_degrees: f32,
}

impl HoopConfig {
    /// Whether a point lies inside the hoop outline.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let half_w = (self.width * 0.5).max(1e-4);
        let half_h = (self.height * 0.5).max(1e-4);
        let (sin_r, cos_r) = self.rotation_degrees.to_radians().sin_cos();
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        let nx = (dx * cos_r + dy * sin_r) / half_w;
        let ny = (-dx * sin_r + dy * cos_r) / half_h;

        match self.shape {
            HoopShape::Circle | HoopShape::Oval => nx * nx + ny * ny <= 1.0,
            HoopShape::Square => nx.abs() <= 1.0 && ny.abs() <= 1.0,
        }
    }
}

/// Select every pixel whose center lies inside the hoop.
pub fn hoop_mask(width: u32, height: u32, hoop: &HoopConfig) -> Result<SelectionMask> {
    let mut data = alloc_filled(pixel_count(width, height)?, 0u8)?;
    for y in 0..height {
        let row = y as usize * width as usize;
        for x in 0..width {
            data[row + x as usize] = u8::from(hoop.contains(x as f32 + 0.5, y as f32 + 0.5));
        }
    }
    SelectionMask::new(width, height, data)
}
