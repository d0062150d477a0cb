//! Format conversion seam
//!
//! The pipeline never implements image decoding itself; it drives an
//! [`ImageConverter`] implementation. Implementations can shell out to an
//! external binary or provide stub functionality for graceful degradation.

mod cli;
mod noop;

pub use cli::CliImageConverter;
pub use noop::NoOpImageConverter;

use crate::config::{ConversionConfig, ToolsConfig};
use crate::error::ConversionError;
use async_trait::async_trait;
use std::sync::Arc;

/// Capabilities of a converter implementation
#[derive(Debug, Clone, Copy)]
pub struct ConverterCapabilities {
    /// Whether format conversion is actually available
    pub can_convert: bool,
}

/// Trait for image format conversion
///
/// This trait defines the interface between the conversion worker and the
/// capability that actually transcodes image bytes. Implementations must be
/// safe to call repeatedly from a single worker; the pipeline guarantees at
/// most one in-flight call per run.
///
/// # Examples
///
/// ```no_run
/// use imgpack::convert::{CliImageConverter, ImageConverter};
/// use imgpack::config::ConversionConfig;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let converter = CliImageConverter::from_path().expect("no converter binary found");
///
/// let heic_bytes = std::fs::read("photo.heic")?;
/// let jpeg = converter
///     .convert(&heic_bytes, "image/heic", &ConversionConfig::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ImageConverter: Send + Sync {
    /// Convert raw image bytes into the configured target format
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw contents of the source image
    /// * `source_media_type` - Declared media type of the source (e.g. "image/heic")
    /// * `conversion` - Target format, media type, and quality
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source bytes cannot be decoded
    /// - The external binary fails to execute (for CLI implementations)
    /// - The operation is not supported (for stub implementations)
    async fn convert(
        &self,
        bytes: &[u8],
        source_media_type: &str,
        conversion: &ConversionConfig,
    ) -> Result<Vec<u8>, ConversionError>;

    /// Query capabilities of this converter
    fn capabilities(&self) -> ConverterCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Select a converter implementation based on tool configuration
///
/// An explicitly configured binary path wins; otherwise the PATH is searched
/// (when `search_path` is enabled); otherwise the no-op converter is used so
/// the pipeline still constructs and reports the missing capability instead
/// of failing at startup.
pub fn from_config(tools: &ToolsConfig) -> Arc<dyn ImageConverter> {
    let converter: Arc<dyn ImageConverter> = if let Some(ref path) = tools.converter_path {
        Arc::new(CliImageConverter::new(path.clone()))
    } else if tools.search_path {
        CliImageConverter::from_path()
            .map(|c| Arc::new(c) as Arc<dyn ImageConverter>)
            .unwrap_or_else(|| Arc::new(NoOpImageConverter))
    } else {
        Arc::new(NoOpImageConverter)
    };

    tracing::info!(
        converter = converter.name(),
        can_convert = converter.capabilities().can_convert,
        "converter initialized"
    );

    converter
}
