//! # Diagram — Pallet Layout Support for Physical Labeling
//!
//! Inspectors draw a diagram of every pallet they open so the sampled boxes
//! can be found and labelled. This module decides which pallets need a
//! diagram, checks that the caller configured exactly those pallets, and
//! places a box inside a pallet's layer grid.
//!
//! A pallet layer is `base` boxes wide; box `n` (1-based, local to its pallet)
//! sits in row `ceil(n / base)` counted from the top and column
//! `((n - 1) mod base) + 1`. The base is split into two visible faces for
//! the drawing; common bases have fixed splits, others are halved.

use crate::error::SamplingError;
use crate::model::SamplingMode;
use serde::{Deserialize, Serialize};

/// Pallets that need a diagram: all of them for simple sampling, only the
/// selected ones for staged sampling.
pub fn diagram_pallets(mode: SamplingMode, pallet_count: u32, selected: &[u32]) -> Vec<u32> {
    match mode {
        SamplingMode::Simple => (1..=pallet_count).collect(),
        SamplingMode::Staged => {
            let mut pallets = selected.to_vec();
            pallets.sort_unstable();
            pallets.dedup();
            pallets
        }
    }
}

/// Fail unless the configured pallets are exactly the expected set.
pub fn check_pallet_configurations(expected: &[u32], provided: &[u32]) -> Result<(), SamplingError> {
    let mut want = expected.to_vec();
    want.sort_unstable();
    want.dedup();
    let mut got = provided.to_vec();
    got.sort_unstable();

    if want != got {
        return Err(SamplingError::ConfigurationMismatch {
            expected: want,
            provided: got,
        });
    }
    Ok(())
}

/// Row and column of a box within a pallet layer grid, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: u32,
    pub column: u32,
}

/// Place a pallet-local box number in a grid `base` boxes wide.
pub fn diagram_position(local_number: u32, base: u32) -> Option<GridPosition> {
    if local_number == 0 || base == 0 {
        return None;
    }
    Some(GridPosition {
        row: local_number.div_ceil(base),
        column: (local_number - 1) % base + 1,
    })
}

/// Suggested split of a pallet base into its two visible faces.
pub fn default_face_split(base: u32) -> Vec<u32> {
    match base {
        0 => Vec::new(),
        5 => vec![2, 3],
        6 => vec![3, 3],
        8 => vec![4, 4],
        10 => vec![5, 5],
        b => vec![b / 2, b.div_ceil(2)],
    }
}
