//! Centralized validation and limit helpers.

use crate::core::types::Thresholds;

/// Maximum number of contaminants a panel may hold
pub const MAX_CONTAMINANTS: usize = 64;

/// Default largest per-read k-mer count with its own histogram bucket
pub const DEFAULT_HISTOGRAM_MAX: usize = 1000;

/// Validation error types for run configuration
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("threshold_read must be at least 1 (got {0})")]
    ReadThresholdTooLow(u32),
    #[error("threshold_overall must be at least 1 (got {0})")]
    OverallThresholdTooLow(u32),
    #[error("at least one worker thread is required")]
    NoThreads,
    #[error("progress interval must be at least 1")]
    ZeroProgressInterval,
}

/// Validate classification thresholds (both must be at least 1).
///
/// # Errors
///
/// Returns the first threshold that is zero.
pub fn validate_thresholds(read: u32, overall: u32) -> Result<Thresholds, ValidationError> {
    if read < 1 {
        return Err(ValidationError::ReadThresholdTooLow(read));
    }
    if overall < 1 {
        return Err(ValidationError::OverallThresholdTooLow(overall));
    }
    Ok(Thresholds { read, overall })
}

/// Histogram bucket for a per-read k-mer count; the last bucket absorbs
/// every count at or above `max`.
#[inline]
#[must_use]
pub fn histogram_bucket(kmers: u32, max: usize) -> usize {
    usize::try_from(kmers).map_or(max, |k| k.min(max))
}
