//! # Batch — Parallel Sampling of Many Lots
//!
//! A batch file lists lots as `[[lot]]` tables, each one a
//! [`SamplingRequest`]:
//!
//! ```toml
//! [[lot]]
//! lot_id = "L-001"
//! lot_size = 1200
//! species = "Durazno"
//!
//! [[lot]]
//! lot_id = "L-002"
//! lot_size = 600
//! species = "Manzana"
//! mode = "staged"
//! boxes_per_pallet = [50, 50, 50, 50, 50, 50, 50, 50, 50, 50, 50, 50]
//! ```
//!
//! Lots are independent, so they run on the rayon pool. With a seed, lot `i`
//! draws from `seed + i`, making the whole batch reproducible regardless of
//! scheduling. A failing lot is reported in place and does not stop the rest.

use crate::engine::run_sampling;
use crate::model::{SamplingOutcome, SamplingRequest};
use crate::selection::seeded_rng;
use crate::tables::IntensityIncrement;
use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchFile {
    #[serde(default, rename = "lot")]
    pub lots: Vec<SamplingRequest>,
}

/// Result for one lot of a batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub index: usize,
    pub lot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SamplingOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Parse a batch from a TOML string.
pub fn parse_batch(content: &str) -> Result<BatchFile> {
    let batch: BatchFile = toml::from_str(content)?;
    if batch.lots.is_empty() {
        anyhow::bail!("batch contains no [[lot]] entries");
    }
    Ok(batch)
}

/// Parse a batch from a TOML file path.
pub fn parse_batch_file(path: &Path) -> Result<BatchFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read batch {}: {}", path.display(), e))?;
    parse_batch(&content)
}

/// Apply a default intensity increment to lots that did not set their own.
/// A lot that writes `intensity_increment = 0` keeps it.
pub fn apply_default_increment(lots: &mut [SamplingRequest], increment: IntensityIncrement) {
    for lot in lots {
        if lot.intensity_increment.is_none() {
            lot.intensity_increment = Some(increment);
        }
    }
}

/// Sample every lot in parallel. Entries come back in input order.
pub fn run_batch(lots: &[SamplingRequest], seed: Option<u64>) -> Vec<BatchEntry> {
    lots.par_iter()
        .enumerate()
        .map(|(index, lot)| {
            let outcome = match seed {
                Some(s) => run_sampling(lot, &mut seeded_rng(s.wrapping_add(index as u64))),
                None => run_sampling(lot, &mut rand::rng()),
            };
            let (outcome, error) = match outcome {
                Ok(o) => (Some(o), None),
                Err(e) => (None, Some(e.to_string())),
            };
            BatchEntry {
                index,
                lot_id: lot.lot_id.clone(),
                outcome,
                error,
            }
        })
        .collect()
}
