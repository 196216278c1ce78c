//! # Engine — Request Orchestration
//!
//! Wires the components together for a single [`SamplingRequest`]:
//!
//! ```text
//! simple:  classify → resolve(lot) → increment → draw boxes
//! staged:  validate → select pallets → resolve(selected boxes) → increment
//!          → distribute → continuous numbering
//! ```
//!
//! For staged lots the table is applied to the boxes held by the selected
//! pallets, not to the declared lot; those are the only boxes the sample can
//! come from.
//!
//! The component functions are pure and silent. This layer is the one that
//! logs: one `info_span` per request, an `info` event on success and a `warn`
//! event on rejection.

use crate::error::SamplingError;
use crate::model::{SamplingMode, SamplingOutcome, SamplingRequest, SamplingResult, StageSamplingPlan};
use crate::selection::select_random_boxes_with;
use crate::species::{classify_species, TableFamily};
use crate::stage;
use crate::tables::{manual_display_name, resolve_sample_size, resolve_sample_size_manual};
use crate::InspectionBackend;
use rand::Rng;
use std::sync::Mutex;
use tracing::{info, info_span, warn};

/// Compute the sample for one request.
pub fn run_sampling<R: Rng + ?Sized>(
    request: &SamplingRequest,
    rng: &mut R,
) -> Result<SamplingOutcome, SamplingError> {
    let span = info_span!(
        "sampling",
        lot_id = request.lot_id.as_deref().unwrap_or("-"),
        mode = %request.mode,
        lot_size = request.lot_size,
    );
    let _guard = span.enter();

    let computed = request.validate().and_then(|()| match request.mode {
        SamplingMode::Simple => run_simple(request, rng).map(|r| (r, None, Vec::new())),
        SamplingMode::Staged => run_staged(request, rng)
            .map(|(r, plan, warnings)| (r, Some(plan), warnings)),
    });

    let (result, stage, warnings) = match computed {
        Ok(parts) => parts,
        Err(e) => {
            warn!(error = %e, "sampling rejected");
            return Err(e);
        }
    };

    for w in &warnings {
        warn!(warning = %w, "stage declaration warning");
    }
    info!(
        table = %result.table_family,
        sample_size = result.sample_size,
        population = result.sampled_population,
        "sample generated"
    );

    Ok(SamplingOutcome {
        request_id: uuid::Uuid::new_v4(),
        generated_at: chrono::Utc::now(),
        lot_id: request.lot_id.clone(),
        exporter: request.exporter.clone(),
        mode: request.mode,
        result,
        stage,
        warnings,
    })
}

/// [`run_sampling`] behind the entitlement gate; successful outcomes are
/// handed to the backend for recording.
pub fn run_sampling_gated<R: Rng + ?Sized>(
    request: &SamplingRequest,
    backend: &dyn InspectionBackend,
    rng: &mut R,
) -> Result<SamplingOutcome, SamplingError> {
    if !backend.has_active_subscription() {
        warn!(lot_id = request.lot_id.as_deref().unwrap_or("-"), "subscription inactive");
        return Err(SamplingError::SubscriptionInactive);
    }
    let outcome = run_sampling(request, rng)?;
    backend.record_result(&outcome);
    Ok(outcome)
}

/// Table family, display name and base sample size for a population.
///
/// A species with its own table always wins; a manual percentage only
/// replaces the default percentage rule.
pub fn resolve_table(
    request: &SamplingRequest,
    population: u32,
) -> Result<(TableFamily, String, u32), SamplingError> {
    let family = classify_species(request.species.as_deref());
    match (family, request.manual_percentage) {
        (TableFamily::Percentage, Some(pct)) => {
            let size = resolve_sample_size_manual(population, pct)?;
            Ok((family, manual_display_name(pct), size))
        }
        _ => {
            let (size, name) = resolve_sample_size(population, family)?;
            Ok((family, name.to_string(), size))
        }
    }
}

fn run_simple<R: Rng + ?Sized>(
    request: &SamplingRequest,
    rng: &mut R,
) -> Result<SamplingResult, SamplingError> {
    let lot_size = request.lot_size;
    let (family, name, base) = resolve_table(request, lot_size)?;
    let increment = request.effective_increment();
    let sample_size = increment.apply(base, lot_size, family);
    let boxes = select_random_boxes_with(rng, lot_size, sample_size)?;

    Ok(SamplingResult {
        lot_size,
        table_family: family,
        table_display_name: name,
        base_sample_size: base,
        intensity_increment: increment,
        sample_size,
        sampled_population: lot_size,
        selected_box_numbers: boxes,
    })
}

fn run_staged<R: Rng + ?Sized>(
    request: &SamplingRequest,
    rng: &mut R,
) -> Result<(SamplingResult, StageSamplingPlan, Vec<String>), SamplingError> {
    let boxes = &request.boxes_per_pallet;
    let pallet_count = request.effective_pallet_count();

    let warnings =
        stage::validate_stage_sampling(pallet_count, boxes, request.lot_size).into_result()?;

    let selected = stage::select_stage_pallets_with(rng, pallet_count)?;
    let population = stage::selected_population(boxes, &selected)?;

    let (family, name, base) = resolve_table(request, population)?;
    let increment = request.effective_increment();
    let total = increment.apply(base, population, family);

    let distribution = stage::distribute_proportionally(boxes, &selected, total)?;
    let numbers = stage::generate_stage_box_numbers_with(rng, boxes, &selected, &distribution)?;

    let result = SamplingResult {
        lot_size: request.lot_size,
        table_family: family,
        table_display_name: name,
        base_sample_size: base,
        intensity_increment: increment,
        sample_size: numbers.len() as u32,
        sampled_population: population,
        selected_box_numbers: numbers,
    };
    let plan = StageSamplingPlan {
        selected_pallet_indices: selected,
        per_pallet_sample_counts: distribution,
    };
    Ok((result, plan, warnings))
}

/// In-process backend that keeps recorded outcomes in memory.
pub struct MemoryBackend {
    active: bool,
    recorded: Mutex<Vec<SamplingOutcome>>,
}

impl MemoryBackend {
    pub fn new(active: bool) -> Self {
        MemoryBackend {
            active,
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Outcomes recorded so far, oldest first.
    pub fn recorded(&self) -> Vec<SamplingOutcome> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl InspectionBackend for MemoryBackend {
    fn has_active_subscription(&self) -> bool {
        self.active
    }

    fn record_result(&self, outcome: &SamplingOutcome) {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(outcome.clone());
    }
}
