pub mod config;

pub use config::{AppConfig, CacheConfig, FabricConfig, VectorConfig, CONFIG_ENV};
