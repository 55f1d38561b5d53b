use std::path::PathBuf;

use clap::Parser;
use diffimg::AlphaPresentation;

use crate::config;

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_threshold(v)
}

#[derive(Parser)]
#[command(
    name = "diffimg",
    version,
    about = "Quantify the pixel difference between two images"
)]
pub struct Cli {
    /// First image (PNG, JPEG, ...)
    pub first: PathBuf,

    /// Second image, same width and height as the first
    pub second: PathBuf,

    /// Write a diff image as PNG (default path: diff.png)
    #[arg(
        long,
        short = 'g',
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "diff.png"
    )]
    pub generate: Option<PathBuf>,

    /// Print the bare ratio (0.0-1.0) instead of a percentage sentence
    #[arg(long, short = 'r')]
    pub ratio: bool,

    /// Leave the alpha channel out of the ratio and render the diff opaque
    #[arg(long, short = 'i')]
    pub ignore_alpha: bool,

    /// How alpha differences are drawn into the diff image
    #[arg(long, value_enum)]
    pub alpha: Option<AlphaPresentation>,

    /// Max allowed ratio (0.0-1.0). Exit with 1 when exceeded.
    #[arg(long, short = 't', value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Configuration file (default: ./diffimg.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_inputs() {
        let cli = Cli::try_parse_from(["diffimg", "a.png", "b.png"]).unwrap();
        assert_eq!(cli.first, PathBuf::from("a.png"));
        assert_eq!(cli.second, PathBuf::from("b.png"));
        assert!(cli.generate.is_none());
        assert!(!cli.ratio);
        assert!(!cli.ignore_alpha);
    }

    #[test]
    fn bare_generate_uses_default_path() {
        let cli = Cli::try_parse_from(["diffimg", "--generate", "a.png", "b.png"]).unwrap();
        assert_eq!(cli.generate, Some(PathBuf::from("diff.png")));
        assert_eq!(cli.first, PathBuf::from("a.png"));
    }

    #[test]
    fn generate_with_path() {
        let cli = Cli::try_parse_from(["diffimg", "-g=out/d.png", "a.png", "b.png"]).unwrap();
        assert_eq!(cli.generate, Some(PathBuf::from("out/d.png")));
    }

    #[test]
    fn alpha_mode_parses_kebab_case() {
        let cli =
            Cli::try_parse_from(["diffimg", "--alpha", "force-opaque", "a.png", "b.png"]).unwrap();
        assert_eq!(cli.alpha, Some(AlphaPresentation::ForceOpaque));
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["diffimg", "-t", "1.5", "a.png", "b.png"]).is_err());
        assert!(Cli::try_parse_from(["diffimg", "-t", "0.02", "a.png", "b.png"]).is_ok());
    }

    #[test]
    fn requires_two_inputs() {
        assert!(Cli::try_parse_from(["diffimg", "a.png"]).is_err());
    }
}
