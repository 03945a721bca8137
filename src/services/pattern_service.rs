//! Async front end for the pure pattern pipeline.
//!
//! Every CPU-heavy call runs in `spawn_blocking` so the runtime stays
//! responsive. Quantization results are cached by input digest and region
//! graphs by lock hash.

use serde::Serialize;
use std::sync::Arc;
use stitch_quant::{
    extract_paths, quantize_selection, LegendEntry, LockHash, NormalizedImage, PathOptions,
    QuantizeResult, RegionGraph, Selection, SelectionMask, StitchRaster, VectorPath,
};
use tokio::sync::Mutex;

use crate::error::PipelineError;
use crate::models::AppConfig;
use crate::services::quantize_cache::{compute_cache_key, QuantizeCache};
use crate::services::region_cache::RegionGraphCache;

/// Everything derived from one image and selection
#[derive(Debug, Clone)]
pub struct PatternRun {
    pub quantized: Arc<QuantizeResult>,
    /// Palette labels classified as fabric
    pub fabric_labels: Vec<u16>,
    /// The selection resampled to the image size
    pub selection: Selection,
    pub raster: Arc<StitchRaster>,
    pub graph: Arc<RegionGraph>,
}

impl PatternRun {
    pub fn summary(&self) -> PatternSummary {
        let regions_per_color = self
            .graph
            .regions_by_color
            .iter()
            .zip(&self.graph.colors)
            .map(|(ids, color)| (color.key(), ids.len()))
            .collect();
        PatternSummary {
            width: self.quantized.width,
            height: self.quantized.height,
            palette: self.quantized.palette.hex_colors(),
            fabric_labels: self.fabric_labels.clone(),
            stitches: self.raster.stitch_count(),
            legend: self.raster.legend(),
            region_count: self.graph.regions.len(),
            regions_per_color,
            lock_hash: self.graph.lock_hash,
        }
    }
}

/// Serializable overview of a [`PatternRun`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<String>,
    pub fabric_labels: Vec<u16>,
    pub stitches: usize,
    pub legend: Vec<LegendEntry>,
    pub region_count: usize,
    pub regions_per_color: Vec<(String, usize)>,
    pub lock_hash: LockHash,
}

/// Runs quantization, region building and path extraction off the runtime
pub struct PatternService {
    config: Arc<AppConfig>,
    quantize_cache: Mutex<QuantizeCache>,
    region_cache: RegionGraphCache,
}

impl PatternService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let region_cache = RegionGraphCache::new(config.cache.region_graph_capacity);
        Self::with_region_cache(config, region_cache)
    }

    /// Use an existing region cache, e.g. one shared with another service
    pub fn with_region_cache(config: Arc<AppConfig>, region_cache: RegionGraphCache) -> Self {
        Self {
            quantize_cache: Mutex::new(QuantizeCache::new(config.cache.quantize_capacity)),
            config,
            region_cache,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn region_cache(&self) -> &RegionGraphCache {
        &self.region_cache
    }

    /// Quantize with the configured settings, training on `mask` if given
    pub async fn quantize(
        &self,
        image: Arc<NormalizedImage>,
        mask: Option<Arc<SelectionMask>>,
    ) -> Result<Arc<QuantizeResult>, PipelineError> {
        let config = self.config.processing.clone();
        let key = compute_cache_key(&image, &config, mask.as_deref());

        if let Some(hit) = self.quantize_cache.lock().await.get(&key) {
            tracing::debug!(key = %key, "Quantize cache hit");
            return Ok(hit);
        }

        let result = tokio::task::spawn_blocking(move || {
            quantize_selection(&image, &config, mask.as_deref())
        })
        .await??;
        let result = Arc::new(result);

        self.quantize_cache
            .lock()
            .await
            .store(key, result.clone());
        Ok(result)
    }

    /// Palette labels within the configured distance of the fabric color
    pub fn fabric_labels(&self, result: &QuantizeResult) -> Vec<u16> {
        result
            .palette
            .fabric_labels(self.config.fabric.oklab(), self.config.fabric.threshold)
    }

    /// Stitch raster for a quantization result under a selection mask
    pub fn stitch_raster(
        &self,
        result: &QuantizeResult,
        mask: Option<&SelectionMask>,
    ) -> Result<StitchRaster, PipelineError> {
        let fabric = self.fabric_labels(result);
        Ok(StitchRaster::from_quantized(
            result,
            &fabric,
            mask,
            self.config.fabric.srgb(),
        )?)
    }

    /// Region graph through the shared cache
    pub async fn region_graph(
        &self,
        raster: Arc<StitchRaster>,
        selection: &Selection,
    ) -> Result<Arc<RegionGraph>, PipelineError> {
        Ok(self
            .region_cache
            .get_or_build(raster, &selection.identity())
            .await?)
    }

    /// Vector paths for a quantization result, fabric labels flagged
    pub async fn paths(
        &self,
        result: Arc<QuantizeResult>,
        mask: Option<Arc<SelectionMask>>,
    ) -> Result<Vec<VectorPath>, PipelineError> {
        let excluded = self.fabric_labels(&result);
        let simplify = self.config.vector.simplify;
        let smooth = self.config.vector.smooth;
        let paths = tokio::task::spawn_blocking(move || {
            let mut options = PathOptions::new(simplify, smooth);
            if let Some(mask) = mask.as_deref() {
                options = options.with_mask(mask);
            }
            extract_paths(
                &result.labels,
                result.width,
                result.height,
                result.palette.len(),
                &excluded,
                &options,
            )
        })
        .await??;
        Ok(paths)
    }

    /// Full run: resample the selection to the image, quantize, build the
    /// stitch raster and its region graph.
    pub async fn run(
        &self,
        image: Arc<NormalizedImage>,
        selection: &Selection,
    ) -> Result<PatternRun, PipelineError> {
        let (width, height) = (image.width(), image.height());
        let selection = if selection.width() == width && selection.height() == height {
            selection.clone()
        } else {
            let source = selection.clone();
            tokio::task::spawn_blocking(move || source.resample_to(width, height)).await??
        };

        // The untouched default trains on every pixel
        let mask = match &selection {
            Selection::All { .. } => None,
            Selection::Mask(m) => Some(Arc::new(m.clone())),
        };

        let quantized = self.quantize(image, mask.clone()).await?;
        let fabric_labels = self.fabric_labels(&quantized);
        let raster = Arc::new(self.stitch_raster(&quantized, mask.as_deref())?);
        let graph = self.region_graph(raster.clone(), &selection).await?;

        tracing::info!(
            width,
            height,
            palette = quantized.palette.len(),
            fabric = fabric_labels.len(),
            regions = graph.regions.len(),
            lock_hash = %graph.lock_hash,
            "Pattern pipeline finished"
        );

        Ok(PatternRun {
            quantized,
            fabric_labels,
            selection,
            raster,
            graph,
        })
    }
}
