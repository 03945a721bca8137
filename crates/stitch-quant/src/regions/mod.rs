//! Stitch rasters and the region graph built from them.

mod graph;
mod lock_hash;
mod raster;

pub use graph::{BBox, LabelPoint, Region, RegionGraph, RegionGraphBuilder};
pub use lock_hash::{lock_hash, LockHash, LockHasher};
pub use raster::{color_key, is_fabric_code, LegendEntry, StitchColor, StitchRaster, FABRIC_CODE};
