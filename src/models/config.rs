use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stitch_quant::{Oklab, ProcessingConfig, Srgb};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "STITCHGRID_CONFIG";

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Quantizer settings (camelCase keys, e.g. `colorCount`)
    pub processing: ProcessingConfig,

    /// Background material the pattern is stitched on
    pub fabric: FabricConfig,

    /// Vector path extraction
    pub vector: VectorConfig,

    /// Host-side cache sizes
    pub cache: CacheConfig,
}

/// Fabric color and the distance under which a palette entry counts as fabric
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FabricConfig {
    /// Hex color, `#RGB` or `#RRGGBB`
    pub color: String,

    /// Lightness-weighted OKLab distance
    pub threshold: f32,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            color: "#FFFFFF".to_string(),
            threshold: 0.06,
        }
    }
}

impl FabricConfig {
    /// The fabric color, falling back to white when the hex is invalid
    pub fn srgb(&self) -> Srgb {
        match self.color.parse::<Srgb>() {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(color = %self.color, %e, "Invalid fabric color, using white");
                Srgb::from_u8(255, 255, 255)
            }
        }
    }

    pub fn oklab(&self) -> Oklab {
        Oklab::from(stitch_quant::LinearRgb::from(self.srgb()))
    }
}

/// Simplification and smoothing for traced paths
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct VectorConfig {
    /// RDP tolerance in pixels
    pub simplify: f32,

    /// Chaikin passes
    pub smooth: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            simplify: 0.6,
            smooth: 1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Region graphs kept by lock hash
    pub region_graph_capacity: usize,

    /// Quantization results kept by input digest
    pub quantize_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            region_graph_capacity: 16,
            quantize_capacity: 4,
        }
    }
}

impl AppConfig {
    /// Config path from the command line, else from [`CONFIG_ENV`]
    pub fn resolve_path(cli: Option<PathBuf>) -> Option<PathBuf> {
        cli.or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
    }

    /// Load configuration from a YAML file.
    ///
    /// A missing or unreadable file, or one that fails to parse, yields the
    /// defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        colors = config.processing.color_count,
                        fabric = %config.fabric.color,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        %e,
                        "Failed to parse config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
