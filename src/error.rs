use stitch_quant::QuantError;
use thiserror::Error;

/// Failure to turn an image file into a `NormalizedImage`
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("Unsupported PNG layout: {color_type:?} at {bit_depth:?}")]
    Unsupported {
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
    },

    #[error("Invalid image: {0}")]
    Image(#[from] QuantError),
}

/// Error returned by region-graph builds, shared between joined callers
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Region graph build failed: {0}")]
    Build(#[from] QuantError),

    #[error("Region graph worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Quantization error: {0}")]
    Quant(#[from] QuantError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Image error: {0}")]
    Image(#[from] ImageLoadError),
}
