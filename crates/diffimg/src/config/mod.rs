pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use diffimg::AlphaPresentation;
use serde::{Deserialize, Serialize};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};

pub(crate) const CONFIG_FILE: &str = "diffimg.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_alpha: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<AlphaPresentation>,

    /// Maximum allowed ratio (0.0-1.0). Larger ratios fail the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print the bare ratio instead of a sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<bool>,

    /// Where to write the diff image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn validate_threshold(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("threshold must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

/// Load the file layer.
///
/// An explicit path must exist. Without one, `diffimg.toml` in the working
/// directory is used when present and defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(CONFIG_FILE);
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    if let Some(threshold) = config.diff.threshold {
        validate_threshold(threshold).map_err(|e| anyhow::anyhow!("diff.{e}"))?;
    }
    Ok(config)
}
