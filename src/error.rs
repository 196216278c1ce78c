//! # Error — Sampling Engine Failure Taxonomy
//!
//! Every engine operation returns `Result<T, SamplingError>`. Errors are raised
//! at the point of detection and never retried; the calling layer decides how
//! to present them. The CLI wraps them in `anyhow` like every other failure.

use thiserror::Error;

/// Failures produced by the sampling engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// The lot has no boxes.
    #[error("lot size must be greater than 0")]
    InvalidLotSize,

    /// A manual sampling percentage outside (0, 100].
    #[error("sampling percentage must be in (0, 100], got {0}")]
    InvalidPercentage(f64),

    /// More units requested than the population holds.
    #[error("cannot draw {requested} units from a population of {population}")]
    QuantityExceedsPopulation { requested: u64, population: u64 },

    /// Staged sampling rejected by structural or statistical checks.
    #[error("stage sampling rejected: {}", .reasons.join("; "))]
    StageSamplingInvalid {
        reasons: Vec<String>,
        warnings: Vec<String>,
    },

    /// The pallets a caller configured do not match the pallets expected.
    #[error("pallet configuration mismatch: expected pallets {expected:?}, got {provided:?}")]
    ConfigurationMismatch {
        expected: Vec<u32>,
        provided: Vec<u32>,
    },

    /// The entitlement gate refused to run the request.
    #[error("establishment has no active subscription")]
    SubscriptionInactive,
}

impl SamplingError {
    /// Shorthand for a single-reason stage rejection.
    pub fn stage_invalid(reason: impl Into<String>) -> Self {
        SamplingError::StageSamplingInvalid {
            reasons: vec![reason.into()],
            warnings: Vec::new(),
        }
    }
}
