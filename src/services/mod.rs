pub mod pattern_service;
pub mod quantize_cache;
pub mod region_cache;

pub use pattern_service::{PatternRun, PatternService, PatternSummary};
pub use quantize_cache::{compute_cache_key, QuantizeCache};
pub use region_cache::{CacheStats, RegionGraphCache, RegionGraphTracker};
