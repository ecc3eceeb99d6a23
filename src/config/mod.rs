//! Configuration file support for pathshape.
//!
//! This module handles loading and validating settings from the configuration
//! file located at `~/.config/pathshape/config.toml`. Settings include default
//! raster sizes, cache retry limits and image extraction.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod types;

// Re-export commonly used types at module level
pub use types::{CacheConfig, ExtractConfig, RenderConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_DIMENSION: u32 = 16_384;

/// Main configuration structure containing all user settings.
///
/// All fields have defaults and will use those if not specified in the file.
///
/// # Example TOML
/// ```toml
/// [render]
/// default_width = 256
/// default_height = 256
///
/// [cache]
/// clear_caches_max_retries = 10
///
/// [extract]
/// enabled = true
/// directory = "/tmp/pathshape"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Default raster dimensions
    #[serde(default)]
    pub render: RenderConfig,

    /// Cache retry behaviour
    #[serde(default)]
    pub cache: CacheConfig,

    /// Image extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is
    /// logged.
    ///
    /// Validated ranges:
    /// - `render.default_width`, `render.default_height`: 1 - 16384
    /// - `cache.clear_caches_max_retries`: 0 - 100
    /// - `extract.cleanup_max_retries`: 0 - 10
    fn validate_and_clamp(&mut self) {
        if !(1..=MAX_DIMENSION).contains(&self.render.default_width) {
            log::warn!(
                "Invalid default_width {}, clamping to 1-{} range",
                self.render.default_width,
                MAX_DIMENSION
            );
            self.render.default_width = self.render.default_width.clamp(1, MAX_DIMENSION);
        }

        if !(1..=MAX_DIMENSION).contains(&self.render.default_height) {
            log::warn!(
                "Invalid default_height {}, clamping to 1-{} range",
                self.render.default_height,
                MAX_DIMENSION
            );
            self.render.default_height = self.render.default_height.clamp(1, MAX_DIMENSION);
        }

        if self.cache.clear_caches_max_retries > 100 {
            log::warn!(
                "Invalid clear_caches_max_retries {}, clamping to 0-100 range",
                self.cache.clear_caches_max_retries
            );
            self.cache.clear_caches_max_retries = 100;
        }

        if self.extract.cleanup_max_retries > 10 {
            log::warn!(
                "Invalid cleanup_max_retries {}, clamping to 0-10 range",
                self.extract.cleanup_max_retries
            );
            self.extract.cleanup_max_retries = 10;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("pathshape");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema describing the configuration file.
    pub fn schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
