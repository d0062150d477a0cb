//! Error types for imgpack
//!
//! This module provides the error taxonomy for the library:
//! - `ValidationError` — batch rejected before any worker runs, never retried
//! - `ConversionError` — per-item failure during format conversion; fails the
//!   whole run
//! - `BundlingError` — archive generation failure; fails the whole run
//!
//! Cancellation is deliberately absent from this taxonomy. An explicit cancel
//! is a normal terminal outcome of a run (`RunState::Cancelled`), not an
//! error, and is never surfaced through these types.

use thiserror::Error;

/// Result type alias for imgpack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imgpack
#[derive(Debug, Error)]
pub enum Error {
    /// Batch validation failed; no worker was started
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Format conversion failed for an item
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Archive generation failed
    #[error("bundling error: {0}")]
    Bundling(#[from] BundlingError),

    /// Command rejected because the pipeline is in the wrong state
    #[error("cannot {operation} while {current_state}")]
    InvalidState {
        /// The command that was attempted (e.g. "start", "cancel")
        operation: String,
        /// The pipeline state that prevents the command (e.g. "Converting")
        current_state: String,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g. "limits.max_items")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Batch validation errors
///
/// Checks are applied in a fixed precedence order — format, then count, then
/// total size — and the first failure wins. All variants are detected before
/// any worker runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A candidate file is not in the accepted format set
    #[error("unsupported format: {0}")]
    InvalidFormat(String),

    /// More candidates than the configured item limit
    #[error("too many files: {count} exceeds the limit of {limit}")]
    TooManyItems {
        /// Number of candidate files submitted
        count: usize,
        /// Configured maximum item count
        limit: usize,
    },

    /// Combined candidate size exceeds the configured byte limit
    #[error("batch too large: {total_bytes} bytes exceeds the limit of {limit_bytes} bytes")]
    BatchTooLarge {
        /// Combined size of all candidate files
        total_bytes: u64,
        /// Configured maximum total size
        limit_bytes: u64,
    },

    /// No candidate files were submitted
    #[error("no files selected")]
    EmptyBatch,
}

/// Format conversion errors
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter rejected or failed to process an item
    #[error("failed to convert {name}: {reason}")]
    Failed {
        /// Name of the input item that failed
        name: String,
        /// The reason conversion failed
        reason: String,
    },

    /// External converter binary failed to execute
    #[error("converter tool error: {0}")]
    ExternalTool(String),

    /// Conversion not supported (missing binary, not implemented)
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Archive generation errors
#[derive(Debug, Error)]
pub enum BundlingError {
    /// Adding an entry to the archive failed
    #[error("failed to add archive entry {name}: {reason}")]
    EntryFailed {
        /// Entry name that could not be added
        name: String,
        /// The reason the entry failed
        reason: String,
    },

    /// Finalizing the archive failed
    #[error("failed to finalize archive: {0}")]
    FinalizeFailed(String),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages_name_the_violated_limit() {
        let err = ValidationError::TooManyItems {
            count: 201,
            limit: 200,
        };
        let msg = err.to_string();
        assert!(
            msg.contains("201") && msg.contains("200"),
            "message should carry both the actual count and the limit, got: {msg}"
        );

        let err = ValidationError::BatchTooLarge {
            total_bytes: 5_000_000_000,
            limit_bytes: 4_294_967_296,
        };
        let msg = err.to_string();
        assert!(
            msg.contains("5000000000") && msg.contains("4294967296"),
            "message should carry both the actual size and the limit, got: {msg}"
        );
    }

    #[test]
    fn invalid_format_names_the_offending_file() {
        let err = ValidationError::InvalidFormat("notes.txt".into());
        assert_eq!(err.to_string(), "unsupported format: notes.txt");
    }

    #[test]
    fn validation_error_converts_into_top_level_error() {
        let err: Error = ValidationError::EmptyBatch.into();
        assert!(
            matches!(err, Error::Validation(ValidationError::EmptyBatch)),
            "From<ValidationError> should preserve the variant"
        );
        assert_eq!(err.to_string(), "validation error: no files selected");
    }

    #[test]
    fn conversion_failed_message_names_the_item() {
        let err = ConversionError::Failed {
            name: "IMG_0001.heic".into(),
            reason: "truncated input".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to convert IMG_0001.heic: truncated input"
        );
    }

    #[test]
    fn invalid_state_message_carries_operation_and_state() {
        let err = Error::InvalidState {
            operation: "start".into(),
            current_state: "Converting".into(),
        };
        assert_eq!(err.to_string(), "cannot start while Converting");
    }

    #[test]
    fn bundling_errors_display_entry_context() {
        let err = BundlingError::EntryFailed {
            name: "a.jpg".into(),
            reason: "write failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to add archive entry a.jpg: write failed"
        );
    }
}
