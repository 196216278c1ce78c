//! Second stage, part one: split the total sample across selected pallets.
//!
//! Every selected pallet but the last gets its proportional share, rounded
//! half away from zero and capped at the pallet's box count. The last pallet
//! absorbs whatever remains. Independent rounding can still over- or
//! under-shoot the total (many small shares rounding the same way), so a
//! settling pass moves the difference: a shortfall goes to earlier pallets
//! with spare boxes in ascending order, an excess is taken back from the
//! latest pallets first. The result always sums to the requested total.

use super::checked_selection;
use crate::error::SamplingError;
use std::collections::BTreeMap;

/// Allocate `total_sample` boxes across `selected` pallets in proportion to
/// their box counts. Keys of the returned map are 1-based pallet indices.
pub fn distribute_proportionally(
    boxes_per_pallet: &[u32],
    selected: &[u32],
    total_sample: u32,
) -> Result<BTreeMap<u32, u32>, SamplingError> {
    let selected = checked_selection(boxes_per_pallet, selected)?;
    let boxes = |p: u32| boxes_per_pallet[p as usize - 1] as u64;

    let population: u64 = selected.iter().map(|&p| boxes(p)).sum();
    let total = total_sample as u64;
    if total > population {
        return Err(SamplingError::QuantityExceedsPopulation {
            requested: total,
            population,
        });
    }

    if population == 0 {
        return Ok(selected.iter().map(|&p| (p, 0)).collect());
    }

    let mut allocation: BTreeMap<u32, u64> = BTreeMap::new();
    let Some((&last, rest)) = selected.split_last() else {
        return Ok(BTreeMap::new());
    };

    let mut assigned = 0u64;
    for &p in rest {
        let b = boxes(p);
        // round(total · b / population), half away from zero
        let share = (2 * total as u128 * b as u128 + population as u128) / (2 * population as u128);
        let share = (share as u64).min(b);
        allocation.insert(p, share);
        assigned += share;
    }
    let remainder = total.saturating_sub(assigned).min(boxes(last));
    allocation.insert(last, remainder);
    assigned += remainder;

    if assigned < total {
        let mut residue = total - assigned;
        for &p in &selected {
            if residue == 0 {
                break;
            }
            let current = allocation.entry(p).or_default();
            let add = (boxes(p) - *current).min(residue);
            *current += add;
            residue -= add;
        }
    } else if assigned > total {
        let mut excess = assigned - total;
        for &p in rest.iter().rev() {
            if excess == 0 {
                break;
            }
            let current = allocation.entry(p).or_default();
            let take = (*current).min(excess);
            *current -= take;
            excess -= take;
        }
    }

    Ok(allocation
        .into_iter()
        .map(|(p, n)| (p, n as u32))
        .collect())
}
