//! # Stage — Two-Phase Pallet Sampling
//!
//! Staged sampling ("muestreo por etapa") first samples pallets, then samples
//! boxes inside the chosen pallets only.
//!
//! ## Pipeline
//!
//! ```text
//! pallet declaration (boxes per pallet, declared lot total)
//!     ↓ validate        homogeneity, low outliers, minimum six pallets
//!     ↓ select pallets  ceil(25%) of the lot, at least one
//!     ↓ resolve size    table lookup over the selected pallets' boxes
//!     ↓ distribute      proportional split, last pallet absorbs remainder
//!     ↓ number          continuous numbering over selected pallets only
//! sorted box numbers
//! ```
//!
//! ## Module Structure
//!
//! - [`validation`] — regulatory gate with accumulated errors and warnings
//! - [`pallets`] — first-stage pallet quota and random selection
//! - [`distribution`] — proportional allocation of the total sample
//! - [`numbering`] — continuous box numbering and its inverse
//!
//! Pallet indices are 1-based everywhere in this module.

mod distribution;
mod numbering;
mod pallets;
mod validation;

pub use distribution::*;
pub use numbering::*;
pub use pallets::*;
pub use validation::*;

use crate::error::SamplingError;

/// Sort and de-duplicate a pallet selection, rejecting indices outside
/// `1..=boxes_per_pallet.len()`.
fn checked_selection(boxes_per_pallet: &[u32], selected: &[u32]) -> Result<Vec<u32>, SamplingError> {
    let pallet_count = boxes_per_pallet.len() as u32;
    if selected.iter().any(|&p| p == 0 || p > pallet_count) {
        return Err(SamplingError::ConfigurationMismatch {
            expected: (1..=pallet_count).collect(),
            provided: selected.to_vec(),
        });
    }
    let mut sorted = selected.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    Ok(sorted)
}
