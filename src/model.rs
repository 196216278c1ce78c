//! # Model — Requests and Results
//!
//! Plain data carried into and out of the engine. Nothing here is mutated
//! after construction; every value is computed per request and owned by the
//! caller. All types serialize to JSON for the CLI and for whatever
//! persistence layer records the outcome.

use crate::error::SamplingError;
use crate::species::TableFamily;
use crate::tables::IntensityIncrement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Sampling protocol for a lot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Boxes drawn directly from the whole lot.
    #[default]
    Simple,
    /// Pallets drawn first, then boxes within the chosen pallets.
    Staged,
}

impl std::fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingMode::Simple => write!(f, "simple"),
            SamplingMode::Staged => write!(f, "staged"),
        }
    }
}

/// One lot submitted for sampling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingRequest {
    #[serde(default)]
    pub lot_id: Option<String>,
    #[serde(default)]
    pub exporter: Option<String>,
    pub lot_size: u32,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub mode: SamplingMode,
    /// Defaults to `boxes_per_pallet.len()` for staged lots.
    #[serde(default)]
    pub pallet_count: Option<u32>,
    #[serde(default)]
    pub boxes_per_pallet: Vec<u32>,
    /// Only consulted when the species does not select a regulatory table.
    #[serde(default)]
    pub manual_percentage: Option<f64>,
    /// `None` when the lot does not choose; an explicit 0 is kept as chosen.
    #[serde(default)]
    pub intensity_increment: Option<IntensityIncrement>,
}

impl SamplingRequest {
    pub fn simple(lot_size: u32, species: Option<&str>) -> Self {
        SamplingRequest {
            lot_size,
            species: species.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn staged(lot_size: u32, species: Option<&str>, boxes_per_pallet: Vec<u32>) -> Self {
        SamplingRequest {
            lot_size,
            species: species.map(str::to_string),
            mode: SamplingMode::Staged,
            pallet_count: Some(boxes_per_pallet.len() as u32),
            boxes_per_pallet,
            ..Default::default()
        }
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.manual_percentage = Some(percentage);
        self
    }

    pub fn with_increment(mut self, increment: IntensityIncrement) -> Self {
        self.intensity_increment = Some(increment);
        self
    }

    pub fn with_lot_id(mut self, lot_id: impl Into<String>) -> Self {
        self.lot_id = Some(lot_id.into());
        self
    }

    /// Increment applied to the sample, no increment when unset.
    pub fn effective_increment(&self) -> IntensityIncrement {
        self.intensity_increment.unwrap_or_default()
    }

    /// Declared pallet count, falling back to the number of box counts given.
    pub fn effective_pallet_count(&self) -> u32 {
        self.pallet_count
            .unwrap_or(self.boxes_per_pallet.len() as u32)
    }

    /// Reject requests that cannot be computed at all.
    pub fn validate(&self) -> Result<(), SamplingError> {
        if self.lot_size == 0 {
            return Err(SamplingError::InvalidLotSize);
        }
        if self.pallet_count == Some(0) {
            return Err(SamplingError::stage_invalid("pallet count must be at least 1"));
        }
        if self.mode == SamplingMode::Staged && self.boxes_per_pallet.is_empty() {
            return Err(SamplingError::stage_invalid(
                "staged sampling requires the box count of every pallet",
            ));
        }
        Ok(())
    }
}

/// Sample size and selected boxes for one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingResult {
    pub lot_size: u32,
    pub table_family: TableFamily,
    pub table_display_name: String,
    /// Size required by the table, before any intensity increment.
    pub base_sample_size: u32,
    pub intensity_increment: IntensityIncrement,
    pub sample_size: u32,
    /// Boxes the sample was drawn from: the whole lot for simple sampling,
    /// the selected pallets for staged sampling.
    pub sampled_population: u32,
    pub selected_box_numbers: Vec<u32>,
}

/// Pallet-level part of a staged result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSamplingPlan {
    pub selected_pallet_indices: Vec<u32>,
    pub per_pallet_sample_counts: BTreeMap<u32, u32>,
}

/// Everything produced for one request, ready to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOutcome {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub lot_id: Option<String>,
    pub exporter: Option<String>,
    pub mode: SamplingMode,
    pub result: SamplingResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageSamplingPlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
