//! Configuration types for imgpack

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch acceptance policy (formats, count, total size)
///
/// Groups the limits the validator enforces before a batch ever reaches the
/// pipeline. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of files per batch (default: 200)
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Maximum combined size of a batch in bytes (default: 4 GiB)
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,

    /// Advisory threshold in bytes — validation still succeeds above this but
    /// flags the batch so a UI can warn the user (default: 3 GiB)
    #[serde(default = "default_warn_total_bytes")]
    pub warn_total_bytes: u64,

    /// Accepted file extensions, matched case-insensitively (default: heic, heif)
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Accepted declared media types (default: image/heic, image/heif)
    #[serde(default = "default_accepted_media_types")]
    pub accepted_media_types: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_total_bytes: default_max_total_bytes(),
            warn_total_bytes: default_warn_total_bytes(),
            accepted_extensions: default_accepted_extensions(),
            accepted_media_types: default_accepted_media_types(),
        }
    }
}

/// Target format settings for the conversion stage
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Extension substituted onto output names (default: "jpg")
    #[serde(default = "default_target_extension")]
    pub target_extension: String,

    /// Media type handed to the converter (default: "image/jpeg")
    #[serde(default = "default_target_media_type")]
    pub target_media_type: String,

    /// Encoder quality, 1-100 (default: 90)
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            target_extension: default_target_extension(),
            target_media_type: default_target_media_type(),
            quality: default_quality(),
        }
    }
}

/// External converter binary configuration
///
/// Mirrors the usual external-tool pattern: an explicit path wins, otherwise
/// the PATH is searched, otherwise conversion degrades to a stub that reports
/// the capability as unavailable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the converter executable (auto-detected if None)
    #[serde(default)]
    pub converter_path: Option<PathBuf>,

    /// Whether to search PATH for a converter binary if no explicit path is
    /// set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            converter_path: None,
            search_path: true,
        }
    }
}

/// Compression method for the output archive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    /// Deflate compression (default)
    #[default]
    Deflated,
    /// No compression — entries stored verbatim
    Stored,
}

/// Output archive settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Compression applied to archive entries
    #[serde(default)]
    pub compression: CompressionKind,

    /// Prefix for the timestamp-derived archive filename (default: "converted")
    #[serde(default = "default_archive_prefix")]
    pub file_name_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression: CompressionKind::default(),
            file_name_prefix: default_archive_prefix(),
        }
    }
}

/// Main configuration for the pipeline
///
/// Fields are organized into logical sub-configs:
/// - [`limits`](LimitsConfig) — batch acceptance policy
/// - [`conversion`](ConversionConfig) — target format and quality
/// - [`tools`](ToolsConfig) — external converter binary discovery
/// - [`archive`](ArchiveConfig) — output archive settings
///
/// All sub-config fields are flattened so the JSON/TOML format stays flat.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batch acceptance policy
    #[serde(flatten)]
    pub limits: LimitsConfig,

    /// Target format settings
    #[serde(flatten)]
    pub conversion: ConversionConfig,

    /// External converter binary settings
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Output archive settings
    #[serde(flatten)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Validate the configuration, returning the first inconsistency found
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_items == 0 {
            return Err(Error::Config {
                message: "max_items must be at least 1".to_string(),
                key: Some("limits.max_items".to_string()),
            });
        }
        if self.limits.max_total_bytes == 0 {
            return Err(Error::Config {
                message: "max_total_bytes must be at least 1".to_string(),
                key: Some("limits.max_total_bytes".to_string()),
            });
        }
        if self.limits.warn_total_bytes > self.limits.max_total_bytes {
            return Err(Error::Config {
                message: format!(
                    "warn_total_bytes ({}) must not exceed max_total_bytes ({})",
                    self.limits.warn_total_bytes, self.limits.max_total_bytes
                ),
                key: Some("limits.warn_total_bytes".to_string()),
            });
        }
        if self.limits.accepted_extensions.is_empty() && self.limits.accepted_media_types.is_empty()
        {
            return Err(Error::Config {
                message: "at least one accepted extension or media type is required".to_string(),
                key: Some("limits.accepted_extensions".to_string()),
            });
        }
        if self.conversion.quality == 0 || self.conversion.quality > 100 {
            return Err(Error::Config {
                message: format!(
                    "quality must be between 1 and 100, got {}",
                    self.conversion.quality
                ),
                key: Some("conversion.quality".to_string()),
            });
        }
        if self.conversion.target_extension.is_empty() {
            return Err(Error::Config {
                message: "target_extension must not be empty".to_string(),
                key: Some("conversion.target_extension".to_string()),
            });
        }
        Ok(())
    }
}

fn default_max_items() -> usize {
    200
}

fn default_max_total_bytes() -> u64 {
    4 * 1024 * 1024 * 1024 // 4 GiB
}

fn default_warn_total_bytes() -> u64 {
    3 * 1024 * 1024 * 1024 // 3 GiB
}

fn default_accepted_extensions() -> Vec<String> {
    vec!["heic".to_string(), "heif".to_string()]
}

fn default_accepted_media_types() -> Vec<String> {
    vec!["image/heic".to_string(), "image/heif".to_string()]
}

fn default_target_extension() -> String {
    "jpg".to_string()
}

fn default_target_media_type() -> String {
    "image/jpeg".to_string()
}

fn default_quality() -> u8 {
    90
}

fn default_archive_prefix() -> String {
    "converted".to_string()
}

fn default_true() -> bool {
    true
}
