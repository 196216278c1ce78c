//! First stage: choose which pallets are opened.

use crate::error::SamplingError;
use crate::selection::select_random_boxes_with;
use rand::Rng;

/// Number of pallets inspected: a quarter of the lot, rounded up, at least one.
pub fn pallet_quota(pallet_count: u32) -> u32 {
    pallet_count.div_ceil(4).max(1)
}

/// Randomly pick [`pallet_quota`] distinct pallets, 1-based and sorted.
pub fn select_stage_pallets(pallet_count: u32) -> Result<Vec<u32>, SamplingError> {
    select_stage_pallets_with(&mut rand::rng(), pallet_count)
}

/// [`select_stage_pallets`] with an explicit RNG.
pub fn select_stage_pallets_with<R: Rng + ?Sized>(
    rng: &mut R,
    pallet_count: u32,
) -> Result<Vec<u32>, SamplingError> {
    select_random_boxes_with(rng, pallet_count, pallet_quota(pallet_count))
}
