//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains the
//! execution logic for each subcommand, the merge of configuration file and
//! flags, and rayon configuration.

use anyhow::Result;
use phytosample::config::{self, OutputFormat};
use phytosample::{
    batch, classify_species, diagram, report, resolve_table, run_sampling, selection, stage,
    tables, IntensityIncrement, SamplingMode, SamplingRequest, TableFamily,
};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use super::{Cli, Commands};

// ── Settings ────────────────────────────────────────────────────

/// Effective options after layering flags over the configuration file.
pub struct Settings {
    pub seed: Option<u64>,
    pub increment: IntensityIncrement,
    pub format: OutputFormat,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = config::load(cli.config.as_deref())?;
        let increment = match cli.increment {
            Some(pct) => IntensityIncrement::try_from(pct).map_err(anyhow::Error::msg)?,
            None => file.sampling.intensity_increment,
        };
        Ok(Settings {
            seed: cli.seed.or(file.sampling.seed),
            increment,
            format: cli.format.unwrap_or(file.output.format),
        })
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => print!("{}", text()),
        }
        Ok(())
    }
}

// ── Sampling ────────────────────────────────────────────────────

/// Build the request for a `sample` or `staged` subcommand.
pub fn request_for(command: &Commands, settings: &Settings) -> Result<SamplingRequest> {
    let mut request = match command {
        Commands::Sample {
            lot_size,
            species,
            percentage,
            lot_id,
            exporter,
        } => SamplingRequest {
            lot_id: lot_id.clone(),
            exporter: exporter.clone(),
            manual_percentage: *percentage,
            ..SamplingRequest::simple(*lot_size, species.as_deref())
        },
        Commands::Staged {
            lot_size,
            boxes,
            pallet_count,
            species,
            percentage,
            lot_id,
            exporter,
        } => {
            let mut request = SamplingRequest::staged(*lot_size, species.as_deref(), boxes.clone());
            if pallet_count.is_some() {
                request.pallet_count = *pallet_count;
            }
            SamplingRequest {
                lot_id: lot_id.clone(),
                exporter: exporter.clone(),
                manual_percentage: *percentage,
                ..request
            }
        }
        _ => anyhow::bail!("subcommand does not describe a lot"),
    };
    request.intensity_increment = Some(settings.increment);
    Ok(request)
}

pub fn run_sample(settings: &Settings, request: &SamplingRequest) -> Result<()> {
    let outcome = match settings.seed {
        Some(seed) => run_sampling(request, &mut selection::seeded_rng(seed)),
        None => run_sampling(request, &mut rand::rng()),
    }?;
    settings.emit(&outcome, || report::format_outcome(&outcome))
}

#[derive(Serialize)]
struct SizeReport {
    lot_size: u32,
    table_family: TableFamily,
    table_display_name: String,
    base_sample_size: u32,
    intensity_increment: IntensityIncrement,
    sample_size: u32,
}

pub fn run_size(
    settings: &Settings,
    lot_size: u32,
    species: Option<&str>,
    percentage: Option<f64>,
) -> Result<()> {
    let mut request = SamplingRequest::simple(lot_size, species);
    request.manual_percentage = percentage;
    request.validate()?;

    let (family, name, base) = resolve_table(&request, lot_size)?;
    let size = SizeReport {
        lot_size,
        table_family: family,
        table_display_name: name,
        base_sample_size: base,
        intensity_increment: settings.increment,
        sample_size: settings.increment.apply(base, lot_size, family),
    };
    settings.emit(&size, || {
        let mut text = format!("{}: {} of {} boxes", size.table_display_name, size.sample_size, lot_size);
        if size.intensity_increment.percent() > 0 {
            text.push_str(&format!(
                " (base {} +{}%)",
                size.base_sample_size,
                size.intensity_increment.percent()
            ));
        }
        text.push('\n');
        text
    })
}

pub fn run_classify(settings: &Settings, species: Option<&str>) -> Result<()> {
    let family = classify_species(species);
    let value = serde_json::json!({
        "species": species,
        "table_family": family,
        "table_display_name": family.display_name(),
    });
    settings.emit(&value, || {
        format!(
            "{} → {} ({})\n",
            species.unwrap_or("(none)"),
            family.display_name(),
            family
        )
    })
}

// ── Staged Declarations ─────────────────────────────────────────

pub fn run_validate(
    settings: &Settings,
    lot_size: u32,
    boxes: &[u32],
    pallet_count: Option<u32>,
) -> Result<()> {
    let pallet_count = pallet_count.unwrap_or(boxes.len() as u32);
    let validation = stage::validate_stage_sampling(pallet_count, boxes, lot_size);
    settings.emit(&validation, || report::format_validation(&validation))?;
    if !validation.is_valid {
        anyhow::bail!(
            "stage sampling rejected: {}",
            validation.fatal_errors.join("; ")
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct LocateReport {
    number: u32,
    #[serde(flatten)]
    location: stage::BoxLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<diagram::GridPosition>,
}

pub fn run_locate(
    settings: &Settings,
    boxes: &[u32],
    selected: &[u32],
    number: u32,
    base: Option<u32>,
) -> Result<()> {
    let location = stage::locate_box(boxes, selected, number)?.ok_or_else(|| {
        anyhow::anyhow!("box {} is outside the selected pallets", number)
    })?;
    let position = base.and_then(|b| diagram::diagram_position(location.local_number, b));
    let located = LocateReport {
        number,
        location,
        position,
    };
    settings.emit(&located, || {
        let mut text = format!(
            "box {} → pallet {}, box {}",
            number, location.pallet, location.local_number
        );
        if let Some(p) = position {
            text.push_str(&format!(", row {} column {}", p.row, p.column));
        }
        text.push('\n');
        text
    })
}

#[derive(Serialize)]
struct DiagramReport {
    mode: SamplingMode,
    pallets: Vec<u32>,
    base: u32,
    faces: Vec<u32>,
}

/// Pallets to draw for a lot: every pallet when sampling is simple, the
/// selected ones when staged. `configured`, when given, must match exactly.
pub fn run_diagram(
    settings: &Settings,
    pallet_count: u32,
    selected: &[u32],
    base: u32,
    configured: &[u32],
) -> Result<()> {
    if let Some(p) = selected.iter().find(|&&p| p == 0 || p > pallet_count) {
        anyhow::bail!("pallet {} is outside 1..={}", p, pallet_count);
    }
    let mode = if selected.is_empty() {
        SamplingMode::Simple
    } else {
        SamplingMode::Staged
    };
    let pallets = diagram::diagram_pallets(mode, pallet_count, selected);
    if !configured.is_empty() {
        diagram::check_pallet_configurations(&pallets, configured)?;
    }
    let faces = diagram::default_face_split(base);

    let plan = DiagramReport {
        mode,
        pallets,
        base,
        faces,
    };
    settings.emit(&plan, || {
        let list = |v: &[u32]| {
            v.iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
        };
        format!(
            "{} lot: diagram pallets {}\nbase {} boxes, faces {}\n",
            plan.mode,
            list(&plan.pallets).join(", "),
            plan.base,
            list(&plan.faces).join(" + ")
        )
    })
}

// ── Batch ───────────────────────────────────────────────────────

pub fn run_batch(settings: &Settings, file: &Path) -> Result<()> {
    let mut lots = batch::parse_batch_file(file)?.lots;
    batch::apply_default_increment(&mut lots, settings.increment);

    info!(
        lots = lots.len(),
        threads = rayon::current_num_threads(),
        "batch starting"
    );
    let entries = batch::run_batch(&lots, settings.seed);
    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    info!(lots = entries.len(), failed, "batch complete");

    settings.emit(&entries, || report::format_batch(&entries))?;
    if failed > 0 {
        anyhow::bail!("{} of {} lots failed", failed, entries.len());
    }
    Ok(())
}

// ── Tables ──────────────────────────────────────────────────────

pub fn run_tables(settings: &Settings) -> Result<()> {
    let families: Vec<_> = TableFamily::ALL
        .iter()
        .map(|family| {
            serde_json::json!({
                "table_family": family,
                "display_name": family.display_name(),
                "ranges": tables::table_for(*family),
                "species": family.species(),
            })
        })
        .collect();
    settings.emit(&families, report::format_tables)
}

// ── Rayon ───────────────────────────────────────────────────────

/// Size the global rayon pool. `None` or `0` keeps rayon's default of one
/// thread per logical core.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!(error = %e, "Could not configure rayon thread pool");
        }
    }
}
