//! Shared test helpers for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// The phytosample binary with a clean environment: no inherited config file
/// and logging silenced so stderr carries only errors.
#[allow(deprecated)]
pub fn phytosample() -> Command {
    let mut cmd = Command::cargo_bin("phytosample").unwrap();
    cmd.env_remove("PHYTOSAMPLE_CONFIG")
        .env_remove("LOG_FORMAT")
        .env("RUST_LOG", "error");
    cmd
}

/// Write `content` to `name` inside `dir` and return the full path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A twelve-pallet staged lot of 50 boxes each.
pub const TWELVE_PALLETS: &str = "50,50,50,50,50,50,50,50,50,50,50,50";

/// Batch with two valid lots and one that must fail.
pub const MIXED_BATCH: &str = r#"
[[lot]]
lot_id = "L-001"
lot_size = 1200
species = "Durazno"

[[lot]]
lot_id = "L-002"
lot_size = 600
species = "Manzana"
mode = "staged"
boxes_per_pallet = [50, 50, 50, 50, 50, 50, 50, 50, 50, 50, 50, 50]

[[lot]]
lot_id = "L-003"
lot_size = 0
"#;

/// Batch where every lot is valid.
pub const VALID_BATCH: &str = r#"
[[lot]]
lot_id = "L-010"
lot_size = 5000
species = "Damasco"

[[lot]]
lot_id = "L-011"
lot_size = 300
"#;
