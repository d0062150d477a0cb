//! Batch validation — format, count, and size policy enforcement
//!
//! Validation runs entirely before any worker is spawned. Errors produced
//! here are resolved locally and never reach the worker layer.

use crate::config::LimitsConfig;
use crate::error::ValidationError;
use crate::types::{Batch, InputItem};

/// A batch that passed validation, plus the non-fatal size advisory
#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    /// The accepted batch
    pub batch: Batch,
    /// True when the combined size exceeded the advisory threshold but not
    /// the hard limit — surfaced to the UI only, never blocks the run
    pub size_warning: bool,
}

/// Validate a candidate file list against the acceptance policy
///
/// Checks run in a fixed precedence order and the first failure wins:
///
/// 1. every candidate's extension (case-insensitive) or declared media type
///    must be in the accepted set — [`ValidationError::InvalidFormat`] names
///    the first offender;
/// 2. candidate count must not exceed `max_items` —
///    [`ValidationError::TooManyItems`];
/// 3. combined size must not exceed `max_total_bytes` —
///    [`ValidationError::BatchTooLarge`].
///
/// An empty candidate list is rejected up front with
/// [`ValidationError::EmptyBatch`] — there is nothing for the format check to
/// inspect and a zero-item run is meaningless.
///
/// Crossing the advisory `warn_total_bytes` threshold (without crossing the
/// hard limit) still succeeds and sets [`ValidatedBatch::size_warning`].
///
/// No side effects: the validator only produces the batch or the error, and
/// never touches the workers.
pub fn validate(
    candidates: Vec<InputItem>,
    limits: &LimitsConfig,
) -> Result<ValidatedBatch, ValidationError> {
    if candidates.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    for candidate in &candidates {
        if !is_accepted(candidate, limits) {
            return Err(ValidationError::InvalidFormat(candidate.name.clone()));
        }
    }

    if candidates.len() > limits.max_items {
        return Err(ValidationError::TooManyItems {
            count: candidates.len(),
            limit: limits.max_items,
        });
    }

    let total_bytes: u64 = candidates.iter().map(InputItem::size_bytes).sum();
    if total_bytes > limits.max_total_bytes {
        return Err(ValidationError::BatchTooLarge {
            total_bytes,
            limit_bytes: limits.max_total_bytes,
        });
    }

    let size_warning = total_bytes > limits.warn_total_bytes;
    if size_warning {
        tracing::warn!(
            total_bytes,
            warn_total_bytes = limits.warn_total_bytes,
            "batch exceeds advisory size threshold"
        );
    }

    Ok(ValidatedBatch {
        batch: Batch::from_validated(candidates),
        size_warning,
    })
}

/// Whether a candidate matches the accepted extension or media type sets
fn is_accepted(candidate: &InputItem, limits: &LimitsConfig) -> bool {
    if let Some(dot) = candidate.name.rfind('.')
        && dot > 0
    {
        let ext = candidate.name[dot + 1..].to_lowercase();
        if limits
            .accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&ext))
        {
            return true;
        }
    }

    limits
        .accepted_media_types
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(&candidate.media_type))
}
