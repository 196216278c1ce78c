//! # Config — TOML Sampler Configuration
//!
//! Optional settings shared by every subcommand:
//!
//! ```toml
//! [sampling]
//! seed = 42                 # reproducible draws (omit for fresh randomness)
//! intensity_increment = 20  # 0, 20 or 40
//!
//! [output]
//! format = "json"           # "text" or "json"
//! ```
//!
//! The file is found through `--config` or `PHYTOSAMPLE_CONFIG`. With
//! neither set, defaults apply. Command-line flags override the file.

use crate::tables::IntensityIncrement;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PHYTOSAMPLE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The `[sampling]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    pub seed: Option<u64>,
    #[serde(default)]
    pub intensity_increment: IntensityIncrement,
}

/// The `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected text or json)", other)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a configuration from a TOML string.
pub fn parse_toml(content: &str) -> Result<SamplerConfig> {
    let config: SamplerConfig = toml::from_str(content)?;
    Ok(config)
}

/// Parse a configuration from a TOML file path.
pub fn parse_toml_file(path: &Path) -> Result<SamplerConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    parse_toml(&content)
}

/// Resolve the configuration file path: explicit flag, then environment.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

/// Load the configuration, or defaults when no file is configured.
pub fn load(explicit: Option<&Path>) -> Result<SamplerConfig> {
    match config_path(explicit) {
        Some(path) => parse_toml_file(&path),
        None => Ok(SamplerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = parse_toml("").unwrap();
        assert_eq!(config, SamplerConfig::default());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.sampling.seed, None);
    }

    #[test]
    fn parses_full_config() {
        let config = parse_toml(
            r#"
[sampling]
seed = 42
intensity_increment = 40

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.sampling.seed, Some(42));
        assert_eq!(config.sampling.intensity_increment, IntensityIncrement::Forty);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn rejects_unregulated_increment() {
        assert!(parse_toml("[sampling]\nintensity_increment = 25\n").is_err());
    }

    #[test]
    fn rejects_unknown_format_and_keys() {
        assert!(parse_toml("[output]\nformat = \"xml\"\n").is_err());
        assert!(parse_toml("[sampling]\nsed = 1\n").is_err());
    }

    #[test]
    fn output_format_from_str_is_case_insensitive() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let p = Path::new("/tmp/explicit.toml");
        assert_eq!(config_path(Some(p)), Some(p.to_path_buf()));
    }
}
