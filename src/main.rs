//! # Main — CLI Entry Point
//!
//! Routes subcommands to the sampling engine. Handles shared concerns:
//! configuration loading, logging setup and the Rayon thread pool.
//!
//! ## Subcommands
//!
//! - `classify`: species name to table family.
//! - `size`: regulatory sample size for a lot, without drawing boxes.
//! - `sample`: simple random sampling of a whole lot.
//! - `staged`: two-phase sampling over pallets.
//! - `validate`: check a staged declaration without sampling.
//! - `locate`: map a continuous box number to its pallet and grid position.
//! - `diagram`: pallets that need a diagram, and the face split of their base.
//! - `batch`: sample every lot of a TOML batch file in parallel.
//! - `tables`: print the regulatory tables.
//!
//! ## Global Options
//!
//! - `--config` / `PHYTOSAMPLE_CONFIG`: TOML configuration file.
//! - `--seed`: reproducible draws.
//! - `--format`: `text` or `json`.
//! - `--increment`: sampling intensity increment (0, 20 or 40).
//! - `--threads`: Rayon thread pool size (defaults to all cores).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use phytosample::config::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "phytosample",
    about = "Phytosanitary sampling of export lots under SAG-USDA tables"
)]
struct Cli {
    /// Configuration file (or set PHYTOSAMPLE_CONFIG)
    #[arg(long, global = true, env = "PHYTOSAMPLE_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for reproducible box selection (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output format: text or json (overrides the config file)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Sampling intensity increment in percent: 0, 20 or 40
    #[arg(long, global = true)]
    increment: Option<u32>,

    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which regulatory table a species uses
    Classify {
        /// Species name (omit for the percentage rule)
        #[arg(long)]
        species: Option<String>,
    },
    /// Compute the sample size for a lot without drawing boxes
    Size {
        /// Number of boxes in the lot
        #[arg(long)]
        lot_size: u32,
        /// Species name
        #[arg(long)]
        species: Option<String>,
        /// Manual percentage for species without a regulatory table
        #[arg(long)]
        percentage: Option<f64>,
    },
    /// Draw a simple random sample from a whole lot
    Sample {
        /// Number of boxes in the lot
        #[arg(long)]
        lot_size: u32,
        /// Species name
        #[arg(long)]
        species: Option<String>,
        /// Manual percentage for species without a regulatory table
        #[arg(long)]
        percentage: Option<f64>,
        /// Lot identifier carried into the output
        #[arg(long)]
        lot_id: Option<String>,
        /// Exporter carried into the output
        #[arg(long)]
        exporter: Option<String>,
    },
    /// Draw a two-phase sample: pallets first, then boxes
    Staged {
        /// Declared number of boxes in the lot
        #[arg(long)]
        lot_size: u32,
        /// Box count of every pallet, comma separated (e.g. 50,50,48)
        #[arg(long, value_delimiter = ',', required = true)]
        boxes: Vec<u32>,
        /// Declared pallet count (defaults to the number of box counts)
        #[arg(long)]
        pallet_count: Option<u32>,
        /// Species name
        #[arg(long)]
        species: Option<String>,
        /// Manual percentage for species without a regulatory table
        #[arg(long)]
        percentage: Option<f64>,
        /// Lot identifier carried into the output
        #[arg(long)]
        lot_id: Option<String>,
        /// Exporter carried into the output
        #[arg(long)]
        exporter: Option<String>,
    },
    /// Check a staged declaration without sampling
    Validate {
        /// Declared number of boxes in the lot
        #[arg(long)]
        lot_size: u32,
        /// Box count of every pallet, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        boxes: Vec<u32>,
        /// Declared pallet count (defaults to the number of box counts)
        #[arg(long)]
        pallet_count: Option<u32>,
    },
    /// Find a sampled box: pallet, local number and grid position
    Locate {
        /// Box count of every pallet, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        boxes: Vec<u32>,
        /// Selected pallet indices (1-based), comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        selected: Vec<u32>,
        /// Continuous box number to locate
        #[arg(long)]
        number: u32,
        /// Boxes per pallet layer, for the grid position
        #[arg(long)]
        base: Option<u32>,
    },
    /// List the pallets that need a diagram and how their base is split
    Diagram {
        /// Number of pallets in the lot
        #[arg(long)]
        pallet_count: u32,
        /// Selected pallet indices for a staged lot (omit for simple sampling)
        #[arg(long, value_delimiter = ',')]
        selected: Vec<u32>,
        /// Boxes per pallet layer
        #[arg(long)]
        base: u32,
        /// Pallets already configured, checked against the expected set
        #[arg(long, value_delimiter = ',')]
        configured: Vec<u32>,
    },
    /// Sample every lot of a TOML batch file in parallel
    Batch {
        /// Batch file with [[lot]] entries
        file: PathBuf,
    },
    /// Print the regulatory sampling tables
    Tables,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log shippers, human-readable on stderr otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::configure_rayon(cli.threads);
    let settings = cli::Settings::resolve(&cli)?;

    match &cli.command {
        Commands::Classify { species } => cli::run_classify(&settings, species.as_deref()),
        Commands::Size {
            lot_size,
            species,
            percentage,
        } => cli::run_size(&settings, *lot_size, species.as_deref(), *percentage),
        Commands::Sample { .. } | Commands::Staged { .. } => {
            let request = cli::request_for(&cli.command, &settings)?;
            cli::run_sample(&settings, &request)
        }
        Commands::Validate {
            lot_size,
            boxes,
            pallet_count,
        } => cli::run_validate(&settings, *lot_size, boxes, *pallet_count),
        Commands::Locate {
            boxes,
            selected,
            number,
            base,
        } => cli::run_locate(&settings, boxes, selected, *number, *base),
        Commands::Diagram {
            pallet_count,
            selected,
            base,
            configured,
        } => cli::run_diagram(&settings, *pallet_count, selected, *base, configured),
        Commands::Batch { file } => cli::run_batch(&settings, file),
        Commands::Tables => cli::run_tables(&settings),
    }
}
