//! Second stage, part two: draw box numbers under continuous numbering.
//!
//! Selected pallets are numbered as if they were stacked back to back:
//! the first selected pallet owns `1..=b₁`, the second `b₁+1..=b₁+b₂`, and so
//! on. Unselected pallets contribute nothing to the offset. Labels printed
//! for the inspection team carry these numbers, so the convention must not
//! drift toward true lot positions.

use super::checked_selection;
use crate::error::SamplingError;
use crate::selection::select_in_window_with;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Draw the per-pallet sample counts as globally unique, sorted box numbers.
pub fn generate_stage_box_numbers(
    boxes_per_pallet: &[u32],
    selected: &[u32],
    distribution: &BTreeMap<u32, u32>,
) -> Result<Vec<u32>, SamplingError> {
    generate_stage_box_numbers_with(&mut rand::rng(), boxes_per_pallet, selected, distribution)
}

/// [`generate_stage_box_numbers`] with an explicit RNG.
pub fn generate_stage_box_numbers_with<R: Rng + ?Sized>(
    rng: &mut R,
    boxes_per_pallet: &[u32],
    selected: &[u32],
    distribution: &BTreeMap<u32, u32>,
) -> Result<Vec<u32>, SamplingError> {
    let selected = checked_selection(boxes_per_pallet, selected)?;
    if distribution.keys().any(|p| selected.binary_search(p).is_err()) {
        return Err(SamplingError::ConfigurationMismatch {
            expected: selected,
            provided: distribution.keys().copied().collect(),
        });
    }
    selected_population(boxes_per_pallet, &selected)?;

    let mut numbers = Vec::with_capacity(distribution.values().map(|&n| n as usize).sum());
    let mut offset = 0u32;
    for &p in &selected {
        let pallet_boxes = boxes_per_pallet[p as usize - 1];
        let count = distribution.get(&p).copied().unwrap_or(0);
        numbers.extend(select_in_window_with(rng, offset + 1, pallet_boxes, count)?);
        offset += pallet_boxes;
    }
    numbers.sort_unstable();
    Ok(numbers)
}

/// Boxes held by the selected pallets: the population of the second stage.
pub fn selected_population(
    boxes_per_pallet: &[u32],
    selected: &[u32],
) -> Result<u32, SamplingError> {
    let selected = checked_selection(boxes_per_pallet, selected)?;
    let total: u64 = selected
        .iter()
        .map(|&p| boxes_per_pallet[p as usize - 1] as u64)
        .sum();
    u32::try_from(total).map_err(|_| SamplingError::QuantityExceedsPopulation {
        requested: total,
        population: u32::MAX as u64,
    })
}

/// Where a continuously numbered box physically sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxLocation {
    /// 1-based pallet index in the original lot.
    pub pallet: u32,
    /// 1-based box number within that pallet.
    pub local_number: u32,
}

/// Map a continuous box number back to its pallet and local number.
///
/// Returns `None` when the number lies outside the selected population.
pub fn locate_box(
    boxes_per_pallet: &[u32],
    selected: &[u32],
    number: u32,
) -> Result<Option<BoxLocation>, SamplingError> {
    let selected = checked_selection(boxes_per_pallet, selected)?;
    if number == 0 {
        return Ok(None);
    }
    let mut offset = 0u64;
    for &p in &selected {
        let pallet_boxes = boxes_per_pallet[p as usize - 1] as u64;
        if (number as u64) <= offset + pallet_boxes {
            return Ok(Some(BoxLocation {
                pallet: p,
                local_number: (number as u64 - offset) as u32,
            }));
        }
        offset += pallet_boxes;
    }
    Ok(None)
}
