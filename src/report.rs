//! Text rendering of outcomes, validations and tables for the CLI.
//! JSON output goes straight through `serde_json`.

use crate::batch::BatchEntry;
use crate::model::SamplingOutcome;
use crate::species::TableFamily;
use crate::stage::StageValidation;
use crate::tables::table_for;
use std::fmt::Write;

/// Human-readable summary of one sampling outcome.
pub fn format_outcome(outcome: &SamplingOutcome) -> String {
    let r = &outcome.result;
    let mut out = String::new();
    if let Some(id) = &outcome.lot_id {
        let _ = writeln!(out, "Lot:              {}", id);
    }
    if let Some(exporter) = &outcome.exporter {
        let _ = writeln!(out, "Exporter:         {}", exporter);
    }
    let _ = writeln!(out, "Mode:             {}", outcome.mode);
    let _ = writeln!(out, "Table:            {}", r.table_display_name);
    let _ = writeln!(out, "Lot size:         {} boxes", r.lot_size);
    if r.sampled_population != r.lot_size {
        let _ = writeln!(out, "Sampled from:     {} boxes in selected pallets", r.sampled_population);
    }
    if r.intensity_increment.percent() > 0 {
        let _ = writeln!(
            out,
            "Sample size:      {} (base {} +{}%)",
            r.sample_size,
            r.base_sample_size,
            r.intensity_increment.percent()
        );
    } else {
        let _ = writeln!(out, "Sample size:      {}", r.sample_size);
    }

    if let Some(stage) = &outcome.stage {
        let _ = writeln!(out, "Selected pallets: {}", join(&stage.selected_pallet_indices));
        let per_pallet: Vec<String> = stage
            .per_pallet_sample_counts
            .iter()
            .map(|(p, n)| format!("{}→{}", p, n))
            .collect();
        let _ = writeln!(out, "Per pallet:       {}", per_pallet.join(", "));
    }
    let _ = writeln!(out, "Boxes:            {}", join(&r.selected_box_numbers));
    for w in &outcome.warnings {
        let _ = writeln!(out, "Warning:          {}", w);
    }
    out
}

/// Human-readable stage validation report.
pub fn format_validation(validation: &StageValidation) -> String {
    let mut out = String::new();
    let verdict = if validation.is_valid { "ACCEPTED" } else { "REJECTED" };
    let _ = writeln!(out, "Stage sampling: {}", verdict);
    for e in &validation.fatal_errors {
        let _ = writeln!(out, "  error:   {}", e);
    }
    for w in &validation.warnings {
        let _ = writeln!(out, "  warning: {}", w);
    }
    out
}

/// One line per batch entry, followed by the successful outcomes.
pub fn format_batch(entries: &[BatchEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let label = entry.lot_id.clone().unwrap_or_else(|| format!("#{}", entry.index + 1));
        match (&entry.outcome, &entry.error) {
            (Some(o), _) => {
                let _ = writeln!(out, "── {} ──", label);
                out.push_str(&format_outcome(o));
            }
            (None, Some(e)) => {
                let _ = writeln!(out, "── {} ── FAILED: {}", label, e);
            }
            (None, None) => {}
        }
    }
    out
}

/// Every regulatory table and the species that select it.
pub fn format_tables() -> String {
    let mut out = String::new();
    for family in TableFamily::ALL {
        let _ = writeln!(out, "{} ({})", family.display_name(), family);
        match table_for(family) {
            Some(ranges) => {
                for range in ranges {
                    let _ = writeln!(out, "  {}", range);
                }
            }
            None => {
                let _ = writeln!(out, "  lots ≤ 100 → 2");
                let _ = writeln!(out, "  otherwise 2% of the lot, fraction ≥ 0.50 rounds up");
            }
        }
        if family.species().is_empty() {
            let _ = writeln!(out, "  species: any species not listed above");
        } else {
            let _ = writeln!(out, "  species: {}", family.species().join(", "));
        }
        out.push('\n');
    }
    out
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
