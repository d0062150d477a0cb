//! No-op converter for graceful degradation

use super::{ConverterCapabilities, ImageConverter};
use crate::config::ConversionConfig;
use crate::error::ConversionError;
use async_trait::async_trait;

/// No-op converter used when no converter binary is available
///
/// Returns `ConversionError::NotSupported` for every item, which fails a run
/// on its first item with an actionable message instead of panicking or
/// silently producing garbage. This lets the controller construct and report
/// the missing capability even in environments without ImageMagick.
///
/// # Examples
///
/// ```
/// use imgpack::convert::{ImageConverter, NoOpImageConverter};
/// use imgpack::config::ConversionConfig;
///
/// # #[tokio::main]
/// # async fn main() {
/// let converter = NoOpImageConverter;
/// assert!(!converter.capabilities().can_convert);
///
/// let result = converter
///     .convert(b"bytes", "image/heic", &ConversionConfig::default())
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct NoOpImageConverter;

#[async_trait]
impl ImageConverter for NoOpImageConverter {
    async fn convert(
        &self,
        _bytes: &[u8],
        _source_media_type: &str,
        _conversion: &ConversionConfig,
    ) -> Result<Vec<u8>, ConversionError> {
        Err(ConversionError::NotSupported(
            "image conversion requires an external converter binary. \
             Configure converter_path or ensure magick is in PATH."
                .into(),
        ))
    }

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities { can_convert: false }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn convert_returns_not_supported() {
        let result = NoOpImageConverter
            .convert(b"data", "image/heic", &ConversionConfig::default())
            .await;
        assert!(matches!(result, Err(ConversionError::NotSupported(_))));
    }

    #[test]
    fn reports_no_conversion_capability() {
        assert!(!NoOpImageConverter.capabilities().can_convert);
        assert_eq!(NoOpImageConverter.name(), "noop");
    }
}
