//! Application configuration
//!
//! Configuration is read once at startup from a RON file. Every field has a
//! default, so a file only needs the values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::SHADOW_MAP_SIZE;

/// File looked up in the working directory
pub const CONFIG_FILE: &str = "prism.ron";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV: &str = "PRISM_CONFIG";

/// Where the built-in assets are found
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory every asset path is relative to
    pub root: PathBuf,
    /// Typeface JSON font of the text shape
    pub font: String,
    /// Folder of the environment cube map faces
    pub environment: String,
    /// File extension of the cube map faces
    pub environment_extension: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            font: "fonts/prism_block.typeface.json".to_string(),
            environment: "textures/pisa".to_string(),
            environment_extension: "png".to_string(),
        }
    }
}

/// Shadow map filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ShadowFilter {
    /// Single depth comparison
    Hard,
    /// 3x3 percentage-closer filtering
    #[default]
    Pcf,
}

/// Render surface options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    pub antialias: bool,
    /// MSAA sample count used when `antialias` is on (1, 2, 4, 8)
    pub msaa_samples: u32,
    pub shadows: bool,
    pub shadow_filter: ShadowFilter,
    /// Shadow map resolution
    pub shadow_map_size: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            msaa_samples: 4,
            shadows: true,
            shadow_filter: ShadowFilter::Pcf,
            shadow_map_size: SHADOW_MAP_SIZE,
        }
    }
}

impl RendererConfig {
    /// Sample count actually used by the render targets
    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            match self.msaa_samples {
                2 | 4 | 8 => self.msaa_samples,
                _ => 4,
            }
        } else {
            1
        }
    }
}

/// Native window options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Prism".to_string(),
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Whole application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub assets: AssetConfig,
    pub renderer: RendererConfig,
    pub window: WindowConfig,
}

impl AppConfig {
    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Configuration path: `$PRISM_CONFIG`, else `prism.ron`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load from `path`, falling back to defaults
    ///
    /// A missing file is silent; an unreadable or malformed one is logged.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
