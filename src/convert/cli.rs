//! CLI-based converter using an external ImageMagick-compatible binary

use super::{ConverterCapabilities, ImageConverter};
use crate::config::ConversionConfig;
use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Binaries probed on PATH, in preference order
const PATH_CANDIDATES: &[&str] = &["magick", "convert"];

/// CLI-based converter driving an external ImageMagick-compatible binary
///
/// Source bytes are piped through stdin and the converted output is read from
/// stdout, so no temporary files touch the disk. The binary is invoked per
/// item; the pipeline's sequential processing guarantees at most one child
/// process at a time.
///
/// # Examples
///
/// ```no_run
/// use imgpack::convert::CliImageConverter;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let converter = CliImageConverter::new(PathBuf::from("/usr/bin/magick"));
///
/// // Or auto-discover from PATH
/// let converter = CliImageConverter::from_path().expect("magick not found in PATH");
/// ```
pub struct CliImageConverter {
    binary_path: PathBuf,
}

impl CliImageConverter {
    /// Create a new CLI converter with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find a converter binary in PATH
    ///
    /// Probes `magick` first, then the legacy `convert` name. Returns `None`
    /// if neither is found.
    pub fn from_path() -> Option<Self> {
        PATH_CANDIDATES
            .iter()
            .find_map(|candidate| which::which(candidate).ok())
            .map(Self::new)
    }
}

/// Map a media type to the format token the binary expects on its pipe
/// arguments ("image/heic" -> "heic")
fn format_token(media_type: &str) -> &str {
    media_type
        .rsplit('/')
        .next()
        .unwrap_or(media_type)
        .trim_start_matches("x-")
}

#[async_trait]
impl ImageConverter for CliImageConverter {
    async fn convert(
        &self,
        bytes: &[u8],
        source_media_type: &str,
        conversion: &ConversionConfig,
    ) -> Result<Vec<u8>, ConversionError> {
        let source_format = format_token(source_media_type);
        let target_format = format_token(&conversion.target_media_type);

        tracing::debug!(
            binary = %self.binary_path.display(),
            source_format,
            target_format,
            quality = conversion.quality,
            input_bytes = bytes.len(),
            "invoking external converter"
        );

        let mut child = Command::new(&self.binary_path)
            .arg(format!("{source_format}:-"))
            .arg("-quality")
            .arg(conversion.quality.to_string())
            .arg(format!("{target_format}:-"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ConversionError::ExternalTool(format!(
                    "failed to spawn {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        // Feed stdin from a separate task: writing the whole input before
        // draining stdout can deadlock once the pipe buffers fill.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            ConversionError::ExternalTool("converter stdin unavailable".to_string())
        })?;
        let input = bytes.to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await.map_err(|e| {
            ConversionError::ExternalTool(format!("failed to wait for converter: {e}"))
        })?;

        if let Ok(Err(e)) = writer.await {
            // A broken pipe here usually means the child already failed;
            // prefer its stderr below when the exit status is non-zero.
            tracing::debug!(error = %e, "converter stdin write failed");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::ExternalTool(format!(
                "converter exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(ConversionError::ExternalTool(
                "converter produced no output".to_string(),
            ));
        }

        Ok(output.stdout)
    }

    fn capabilities(&self) -> ConverterCapabilities {
        ConverterCapabilities { can_convert: true }
    }

    fn name(&self) -> &'static str {
        "cli"
    }
}
