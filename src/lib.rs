//! # phytosample — Phytosanitary Lot Sampling Engine
//!
//! Determines how many boxes of an export lot must be inspected and which
//! box numbers are drawn, following the official SAG-USDA tables
//! (hypergeometric 3% and 6%, biometric, percentage-based). Staged lots go
//! through a two-phase protocol: pallets first, then boxes inside the chosen
//! pallets under continuous numbering.
//!
//! ## Module Structure
//!
//! - [`species`] — species name to table family
//! - [`tables`] — regulatory tables, percentage rule, clamps, intensity increment
//! - [`selection`] — uniform draws without replacement
//! - [`stage`] — staged-sampling validation, pallet selection, distribution, numbering
//! - [`diagram`] — pallet diagram expectations and box grid positions
//! - [`model`] — requests, results and outcomes
//! - [`engine`] — per-request orchestration, the only layer that logs
//! - [`batch`] — parallel processing of many lots
//! - [`config`] — TOML configuration
//! - [`report`] — text rendering for the CLI

pub mod batch;
pub mod config;
pub mod diagram;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod selection;
pub mod species;
pub mod stage;
pub mod tables;

pub use engine::{resolve_table, run_sampling, run_sampling_gated};
pub use error::SamplingError;
pub use model::{SamplingMode, SamplingOutcome, SamplingRequest, SamplingResult, StageSamplingPlan};
pub use selection::{select_random_boxes, select_random_boxes_with};
pub use species::{classify_species, TableFamily};
pub use stage::{
    distribute_proportionally, generate_stage_box_numbers, select_stage_pallets,
    validate_stage_sampling, StageValidation,
};
pub use tables::{resolve_sample_size, resolve_sample_size_manual, IntensityIncrement};

/// Boundary to the systems that surround the engine: the subscription check
/// that decides whether a request may run, and the store that keeps results.
/// Both are opaque to the engine.
pub trait InspectionBackend: Send + Sync {
    fn has_active_subscription(&self) -> bool;
    fn record_result(&self, outcome: &SamplingOutcome);
}
