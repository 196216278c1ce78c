//! Structural and statistical gate for staged sampling.
//!
//! Violations are accumulated rather than returned on the first failure, so
//! an inspector sees every problem with a pallet declaration at once. Only a
//! shape mismatch or an empty pallet stops the remaining checks, since the
//! averages they rely on would be meaningless.
//!
//! Threshold comparisons are done by integer cross-multiplication so a pallet
//! sitting exactly on the 30% or 60% line is classified the same way on every
//! platform.

use crate::error::SamplingError;
use serde::{Deserialize, Serialize};

/// Staged sampling is undefined below this many pallets.
pub const MIN_STAGE_PALLETS: u32 = 6;
/// Homogeneity is only checked for lots of at most this many pallets.
pub const HOMOGENEITY_MAX_PALLETS: u32 = 15;
/// Low-outlier rule applies from this many pallets upward.
pub const LOW_OUTLIER_MIN_PALLETS: u32 = 10;
/// Number of pallets tolerated below the low-outlier threshold.
pub const MAX_LOW_OUTLIERS: usize = 1;

/// Maximum relative deviation from the average, in tenths (30%).
const MAX_DEVIATION_TENTHS: u64 = 3;
/// Low-outlier threshold as a fraction of the average, in tenths (60%).
const LOW_OUTLIER_TENTHS: u64 = 6;

/// Outcome of [`validate_stage_sampling`]. `is_valid` is true iff there are
/// no fatal errors; warnings never block acceptance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageValidation {
    pub is_valid: bool,
    pub fatal_errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl StageValidation {
    fn new(fatal_errors: Vec<String>, warnings: Vec<String>) -> Self {
        StageValidation {
            is_valid: fatal_errors.is_empty(),
            fatal_errors,
            warnings,
        }
    }

    /// Convert into a `Result`, keeping the warnings on success.
    pub fn into_result(self) -> Result<Vec<String>, SamplingError> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(SamplingError::StageSamplingInvalid {
                reasons: self.fatal_errors,
                warnings: self.warnings,
            })
        }
    }
}

/// Validate a staged-sampling pallet declaration against the regulation.
pub fn validate_stage_sampling(
    pallet_count: u32,
    boxes_per_pallet: &[u32],
    declared_total: u32,
) -> StageValidation {
    let mut fatal = Vec::new();
    let mut warnings = Vec::new();

    if boxes_per_pallet.len() != pallet_count as usize {
        fatal.push(format!(
            "{} pallet box counts given but the lot declares {} pallets",
            boxes_per_pallet.len(),
            pallet_count
        ));
        return StageValidation::new(fatal, warnings);
    }

    let total: u64 = boxes_per_pallet.iter().map(|&b| b as u64).sum();
    let declared = declared_total as u64;
    if total > declared {
        fatal.push(format!(
            "pallets hold {} boxes, {} more than the declared lot of {}",
            total,
            total - declared,
            declared
        ));
    } else if total < declared {
        warnings.push(format!(
            "pallets hold {} boxes, {} fewer than the declared lot of {}",
            total,
            declared - total,
            declared
        ));
    }

    let empty = pallets_where(boxes_per_pallet, |b| b == 0);
    if !empty.is_empty() {
        fatal.push(format!("pallets without boxes: {}", join_indices(&empty)));
        return StageValidation::new(fatal, warnings);
    }

    if pallet_count < MIN_STAGE_PALLETS {
        fatal.push(format!(
            "staged sampling requires at least {} pallets, got {}",
            MIN_STAGE_PALLETS, pallet_count
        ));
    }

    fatal.extend(check_homogeneity(boxes_per_pallet));
    fatal.extend(check_low_outliers(boxes_per_pallet));

    StageValidation::new(fatal, warnings)
}

/// Every pallet must sit within 30% of the average. Only applies to lots of
/// at most [`HOMOGENEITY_MAX_PALLETS`] pallets; returns one error per
/// offending pallet.
pub fn check_homogeneity(boxes_per_pallet: &[u32]) -> Vec<String> {
    let n = boxes_per_pallet.len() as u64;
    let total: u64 = boxes_per_pallet.iter().map(|&b| b as u64).sum();
    if n == 0 || n > HOMOGENEITY_MAX_PALLETS as u64 || total == 0 {
        return Vec::new();
    }
    let average = total as f64 / n as f64;

    boxes_per_pallet
        .iter()
        .enumerate()
        .filter(|&(_, &b)| {
            // |b - total/n| / (total/n) > 0.3  <=>  10·|b·n - total| > 3·total
            let spread = (b as u64 * n).abs_diff(total);
            spread * 10 > MAX_DEVIATION_TENTHS * total
        })
        .map(|(i, &b)| {
            let deviation = (b as f64 - average).abs() / average * 100.0;
            format!(
                "pallet {} has {} boxes, {:.1}% from the average of {:.1} (max 30%)",
                i + 1,
                b,
                deviation,
                average
            )
        })
        .collect()
}

/// At most one pallet may fall strictly below 60% of the average. Only
/// applies from [`LOW_OUTLIER_MIN_PALLETS`] pallets upward.
pub fn check_low_outliers(boxes_per_pallet: &[u32]) -> Option<String> {
    let n = boxes_per_pallet.len() as u64;
    if n < LOW_OUTLIER_MIN_PALLETS as u64 {
        return None;
    }
    let total: u64 = boxes_per_pallet.iter().map(|&b| b as u64).sum();

    // b < 0.6 · total/n  <=>  10·b·n < 6·total
    let low = pallets_where(boxes_per_pallet, |b| {
        b as u64 * n * 10 < LOW_OUTLIER_TENTHS * total
    });
    if low.len() <= MAX_LOW_OUTLIERS {
        return None;
    }
    let threshold = 0.6 * total as f64 / n as f64;
    Some(format!(
        "{} pallets are below 60% of the average ({:.1} boxes): pallets {}; at most {} allowed",
        low.len(),
        threshold,
        join_indices(&low),
        MAX_LOW_OUTLIERS
    ))
}

/// 1-based indices of pallets matching a predicate.
fn pallets_where(boxes_per_pallet: &[u32], pred: impl Fn(u32) -> bool) -> Vec<u32> {
    boxes_per_pallet
        .iter()
        .enumerate()
        .filter(|&(_, &b)| pred(b))
        .map(|(i, _)| i as u32 + 1)
        .collect()
}

fn join_indices(indices: &[u32]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
