//! # imgpack
//!
//! Backend library for batch image conversion and bundling applications.
//!
//! ## Design Philosophy
//!
//! imgpack is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Sequential by design** - One item converts at a time, bounding peak
//!   memory and giving deterministic progress
//! - **Cancellable** - Cooperative, per-run cancellation that can never leak
//!   into the next run
//!
//! A run moves a validated batch through two isolated workers: the conversion
//! worker transcodes each item into the target format, then the bundling
//! worker packs the results into a single zip archive offered for download.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imgpack::{Config, InputItem, PipelineController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = PipelineController::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = controller.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let photo = InputItem::new("photo.heic", std::fs::read("photo.heic")?, "image/heic");
//!     controller.submit_batch(vec![photo]).await?;
//!     controller.start().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive generation
pub mod bundle;
/// Configuration types
pub mod config;
/// Format conversion seam
pub mod convert;
/// Error types
pub mod error;
/// Core pipeline implementation (decomposed into focused submodules)
pub mod pipeline;
/// Core types and events
pub mod types;
/// Output naming utilities
pub mod utils;
/// Batch validation
pub mod validator;

// Re-export commonly used types
pub use bundle::ArchiveBuilder;
pub use config::{ArchiveConfig, CompressionKind, Config, ConversionConfig, LimitsConfig, ToolsConfig};
pub use convert::{CliImageConverter, ConverterCapabilities, ImageConverter, NoOpImageConverter};
pub use error::{BundlingError, ConversionError, Error, Result, ValidationError};
pub use pipeline::PipelineController;
pub use types::{
    ArchiveResult, Batch, ConvertedItem, Event, InputItem, Phase, ProgressEvent, RunId, RunState,
};
pub use validator::{ValidatedBatch, validate};
