//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default raster size for generation requests that do not specify one.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderConfig {
    /// Raster width in pixels (valid range: 1 - 16384)
    #[serde(default = "default_dimension")]
    pub default_width: u32,

    /// Raster height in pixels (valid range: 1 - 16384)
    #[serde(default = "default_dimension")]
    pub default_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_width: default_dimension(),
            default_height: default_dimension(),
        }
    }
}

/// Raster cache behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheConfig {
    /// How many times caches are cleared to retry a raster allocation that
    /// ran out of memory (valid range: 0 - 100)
    #[serde(default = "default_clear_caches_max_retries")]
    pub clear_caches_max_retries: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            clear_caches_max_retries: default_clear_caches_max_retries(),
        }
    }
}

/// Image extraction to temporary files.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractConfig {
    /// Write every generated raster to a temporary PNG
    #[serde(default)]
    pub enabled: bool,

    /// Directory for extracted images; defaults to the platform cache directory
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Attempts made to purge extracted images on shutdown before giving up
    /// (valid range: 0 - 10)
    #[serde(default = "default_cleanup_max_retries")]
    pub cleanup_max_retries: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: None,
            cleanup_max_retries: default_cleanup_max_retries(),
        }
    }
}

fn default_dimension() -> u32 {
    512
}

fn default_clear_caches_max_retries() -> u32 {
    10
}

fn default_cleanup_max_retries() -> u32 {
    3
}
