//! Configuration management for darkroom.
//!
//! Configuration is loaded from a platform-appropriate `config.toml` with
//! sensible defaults. The `[upload]` section is the encode spec handed to the
//! pipeline by the surrounding application; `[limits]` holds the decode
//! hardening ceiling; `[thumbnail]` the derivation bounds.

use crate::error::ConfigError;
use crate::pipeline::encode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for darkroom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact store settings
    pub store: StoreConfig,

    /// Upload encode spec
    pub upload: UploadConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Thumbnail derivation settings
    pub thumbnail: ThumbnailConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (XDG on Linux, Application
    /// Support on macOS, AppData on Windows), falling back to
    /// `~/.darkroom/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "darkroom", "darkroom")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".darkroom").join("config.toml")
            })
    }

    /// Get the resolved upload directory path (with ~ expansion).
    pub fn upload_dir(&self) -> PathBuf {
        let path_str = self.store.upload_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_width == 0 {
            return Err(ConfigError::Validation(
                "upload.max_width must be at least 1".to_string(),
            ));
        }
        if self.upload.quality == 0 || self.upload.quality > 100 {
            return Err(ConfigError::Validation(format!(
                "upload.quality must be 1-100, got {}",
                self.upload.quality
            )));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "upload.allowed_extensions must not be empty".to_string(),
            ));
        }
        for ext in &self.upload.allowed_extensions {
            if encode::target_for(&ext.to_ascii_lowercase()).is_none() {
                return Err(ConfigError::Validation(format!(
                    "upload.allowed_extensions contains '{ext}', which has no encoder"
                )));
            }
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be at least 1".to_string(),
            ));
        }
        if self.thumbnail.max_width == 0 || self.thumbnail.max_height == 0 {
            return Err(ConfigError::Validation(
                "thumbnail bounds must be at least 1x1".to_string(),
            ));
        }
        if self.thumbnail.quality == 0 || self.thumbnail.quality > 100 {
            return Err(ConfigError::Validation(format!(
                "thumbnail.quality must be 1-100, got {}",
                self.thumbnail.quality
            )));
        }
        Ok(())
    }
}

/// Artifact store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Flat directory holding main artifacts and their thumbnail siblings
    pub upload_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
        }
    }
}

/// Upload encode spec, supplied by the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum stored width in pixels; wider rasters are downsampled
    pub max_width: u32,

    /// Quality for lossy encode targets (1-100)
    pub quality: u8,

    /// Claimed extensions accepted for upload (case-insensitive)
    pub allowed_extensions: Vec<String>,

    /// Maximum upload size in bytes, enforced by the caller before the
    /// pipeline is invoked
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_width: 1200,
            quality: 85,
            allowed_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
            ],
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl UploadConfig {
    /// Comma-separated allow-list for error messages.
    pub fn allowed_display(&self) -> String {
        self.allowed_extensions.join(", ")
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum decoded pixel count (width x height); headers claiming more
    /// are refused before any pixel buffer is allocated
    pub max_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pixels: 40_000_000,
        }
    }
}

/// Thumbnail derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Bounding box width in pixels
    pub max_width: u32,

    /// Bounding box height in pixels
    pub max_height: u32,

    /// Quality for lossy thumbnail encodes (1-100)
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: 200,
            max_height: 200,
            quality: 80,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Output format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.upload.max_width, 1200);
        assert_eq!(config.upload.quality, 85);
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.upload.allowed_extensions, ["png", "jpg", "jpeg"]);
        assert_eq!(config.thumbnail.max_width, 200);
        assert_eq!(config.thumbnail.quality, 80);
    }

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_max_width_is_rejected() {
        let mut config = Config::default();
        config.upload.max_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut config = Config::default();
        config.upload.allowed_extensions.push("psd".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let mut config = Config::default();
        config.upload.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_roundtrip_preserves_upload_section() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.upload.max_width, config.upload.max_width);
        assert_eq!(
            parsed.upload.allowed_extensions,
            config.upload.allowed_extensions
        );
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let parsed: Config = toml::from_str("[upload]\nmax_width = 800\n").unwrap();
        assert_eq!(parsed.upload.max_width, 800);
        assert_eq!(parsed.upload.quality, 85);
        assert_eq!(parsed.thumbnail.max_height, 200);
    }
}
