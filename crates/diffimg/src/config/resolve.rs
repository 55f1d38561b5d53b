use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use diffimg::{AlphaPresentation, DiffOptions};

use super::{Config, load, validate_threshold};

const ENV_IGNORE_ALPHA: &str = "DIFFIMG_IGNORE_ALPHA";
const ENV_ALPHA: &str = "DIFFIMG_ALPHA";
const ENV_THRESHOLD: &str = "DIFFIMG_THRESHOLD";
const ENV_RATIO: &str = "DIFFIMG_RATIO";

/// Values extracted from the CLI that participate in the merge.
///
/// Boolean flags only override when set; an absent flag defers to the
/// lower layers.
#[derive(Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub ignore_alpha: bool,
    pub alpha: Option<AlphaPresentation>,
    pub threshold: Option<f64>,
    pub ratio: bool,
    pub generate: Option<PathBuf>,
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub options: DiffOptions,
    pub threshold: Option<f64>,
    /// Print the bare ratio instead of a sentence.
    pub raw_ratio: bool,
    pub generate: Option<PathBuf>,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        // 1. File layer
        let file_config = load(cli.config.as_deref())?;
        Self::from_layers(cli, |key| std::env::var(key).ok(), file_config)
    }

    fn from_layers<E>(cli: CliOverrides, env: E, file: Config) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        // 2. Env layer
        let env_ignore_alpha = env_bool(&env, ENV_IGNORE_ALPHA)?;
        let env_ratio = env_bool(&env, ENV_RATIO)?;
        let env_alpha = env(ENV_ALPHA)
            .map(|v| AlphaPresentation::from_str(&v, true))
            .transpose()
            .map_err(|e| anyhow!("{ENV_ALPHA}: {e}"))?;
        let env_threshold: Option<f64> = env(ENV_THRESHOLD)
            .map(|v| v.parse::<f64>())
            .transpose()
            .with_context(|| format!("{ENV_THRESHOLD} must be a valid float"))?;

        // 3. CLI > env > file (highest priority first)
        let ignore_alpha = cli
            .ignore_alpha
            .then_some(true)
            .or(env_ignore_alpha)
            .or(file.diff.ignore_alpha)
            .unwrap_or(false);

        let alpha = cli
            .alpha
            .or(env_alpha)
            .or(file.diff.alpha)
            .unwrap_or_default();

        let threshold = cli.threshold.or(env_threshold).or(file.diff.threshold);
        if let Some(t) = threshold {
            validate_threshold(t).map_err(|e| anyhow!("{e}"))?;
        }

        let raw_ratio = cli
            .ratio
            .then_some(true)
            .or(env_ratio)
            .or(file.output.ratio)
            .unwrap_or(false);

        let generate = cli.generate.or(file.output.generate);

        // 4. Reject alpha settings the ratio could not be recovered from
        let options = DiffOptions {
            ignore_alpha,
            alpha,
            generate_image: generate.is_some(),
        };
        options.effective_alpha()?;

        Ok(Self {
            options,
            threshold,
            raw_ratio,
            generate,
        })
    }
}

fn env_bool<E>(env: &E, key: &str) -> Result<Option<bool>>
where
    E: Fn(&str) -> Option<String>,
{
    let Some(raw) = env(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => Err(anyhow!("{key} must be a boolean, got {other:?}")),
    }
}
