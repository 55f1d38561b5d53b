pub mod diff_image;
pub mod ratio;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DiffError;
use crate::channel::MAX_CHANNEL_VALUE;

use self::diff_image::DiffImage;

/// How the alpha delta is written into a rendered diff image.
///
/// This only affects presentation. Ratios are always computed from the
/// true alpha delta, which is re-derived from the stored value when needed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlphaPresentation {
    /// Store `|ΔA|` as is. Two opaque inputs give a fully transparent diff.
    #[default]
    Raw,
    /// Store 255 everywhere.
    ForceOpaque,
    /// Store `255 - |ΔA|`, so unchanged alpha renders opaque.
    Inverted,
}

impl AlphaPresentation {
    pub(crate) fn render(self, delta: u8) -> u8 {
        match self {
            Self::Raw => delta,
            Self::ForceOpaque => MAX_CHANNEL_VALUE,
            Self::Inverted => MAX_CHANNEL_VALUE - delta,
        }
    }

    /// The true alpha delta behind a stored value, if it survived rendering.
    pub(crate) fn recover(self, stored: u8) -> Option<u8> {
        match self {
            Self::Raw => Some(stored),
            Self::ForceOpaque => None,
            Self::Inverted => Some(MAX_CHANNEL_VALUE - stored),
        }
    }
}

/// Options threaded through every diff call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Leave alpha out of the ratio and render the diff image opaque.
    pub ignore_alpha: bool,
    /// Requested alpha presentation for rendered diff images.
    pub alpha: AlphaPresentation,
    /// Render a diff image and derive the ratio from it.
    pub generate_image: bool,
}

impl DiffOptions {
    /// Alpha presentation actually used when rendering.
    ///
    /// With `ignore_alpha` the diff is always opaque. Without it, a
    /// force-opaque diff would lose the alpha deltas the ratio depends on.
    pub fn effective_alpha(&self) -> Result<AlphaPresentation, DiffError> {
        if self.ignore_alpha {
            return Ok(AlphaPresentation::ForceOpaque);
        }
        match self.alpha {
            AlphaPresentation::ForceOpaque => Err(DiffError::InvalidOptions(
                "force-opaque alpha requires ignore-alpha, otherwise alpha \
                 differences cannot be recovered from the diff image"
                    .to_string(),
            )),
            other => Ok(other),
        }
    }
}

#[derive(Debug)]
pub struct DiffResult {
    /// 0.0 = identical, 1.0 = maximally different on every counted channel.
    pub ratio: f64,
    /// Rendered diff image, when requested.
    pub diff_image: Option<DiffImage>,
}

/// Fail with [`DiffError::DimensionMismatch`] unless both grids have the
/// same width and height.
pub fn check_dimensions(left: &RgbaImage, right: &RgbaImage) -> Result<(), DiffError> {
    if left.dimensions() != right.dimensions() {
        return Err(DiffError::DimensionMismatch {
            left_w: left.width(),
            left_h: left.height(),
            right_w: right.width(),
            right_h: right.height(),
        });
    }
    Ok(())
}

/// Compare two grids in the mode selected by `options.generate_image`.
///
/// Without an image the faster ratio-only pass runs. With one, the diff is
/// rendered first and the ratio is read back from it.
pub fn diff(
    left: &RgbaImage,
    right: &RgbaImage,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    debug!(?options, width = left.width(), height = left.height(), "diffing");
    if options.generate_image {
        let image = diff_image::create_diff_image(left, right, options)?;
        let ratio = diff_image::ratio_from_diff_image(&image, options.ignore_alpha)?;
        Ok(DiffResult {
            ratio,
            diff_image: Some(image),
        })
    } else {
        let ratio = ratio::compute_ratio(left, right, options.ignore_alpha)?;
        Ok(DiffResult {
            ratio,
            diff_image: None,
        })
    }
}

/// Number of channels that contribute to the ratio.
pub(crate) fn counted_channels(ignore_alpha: bool) -> u64 {
    if ignore_alpha { 3 } else { 4 }
}

/// Normalize a summed channel delta by the largest possible sum.
///
/// An empty grid has nothing to differ and yields 0.0.
pub(crate) fn normalize_sum(sum: u64, width: u32, height: u32, ignore_alpha: bool) -> f64 {
    let max = u64::from(width)
        * u64::from(height)
        * u64::from(MAX_CHANNEL_VALUE)
        * counted_channels(ignore_alpha);
    if max == 0 {
        return 0.0;
    }
    sum as f64 / max as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    #[test]
    fn matching_dimensions_pass() {
        assert!(check_dimensions(&solid(3, 3, [0; 4]), &solid(3, 3, [9; 4])).is_ok());
    }

    #[test]
    fn dimension_mismatch_reports_both_sizes() {
        let err = check_dimensions(&solid(3, 3, [0; 4]), &solid(4, 4, [0; 4])).unwrap_err();
        assert!(matches!(
            err,
            DiffError::DimensionMismatch {
                left_w: 3,
                left_h: 3,
                right_w: 4,
                right_h: 4,
            }
        ));
        assert_eq!(err.to_string(), "image dimensions are different: 3x3 vs 4x4");
    }

    #[test]
    fn equal_area_is_not_enough() {
        let err = check_dimensions(&solid(2, 8, [0; 4]), &solid(4, 4, [0; 4])).unwrap_err();
        assert!(matches!(err, DiffError::DimensionMismatch { .. }));
    }

    #[test]
    fn ignore_alpha_always_renders_opaque() {
        for alpha in [
            AlphaPresentation::Raw,
            AlphaPresentation::ForceOpaque,
            AlphaPresentation::Inverted,
        ] {
            let options = DiffOptions {
                ignore_alpha: true,
                alpha,
                generate_image: true,
            };
            assert_eq!(
                options.effective_alpha().unwrap(),
                AlphaPresentation::ForceOpaque
            );
        }
    }

    #[test]
    fn force_opaque_without_ignore_alpha_is_rejected() {
        let options = DiffOptions {
            ignore_alpha: false,
            alpha: AlphaPresentation::ForceOpaque,
            generate_image: true,
        };
        assert!(matches!(
            options.effective_alpha(),
            Err(DiffError::InvalidOptions(_))
        ));
    }

    #[test]
    fn presentation_round_trips_alpha_delta() {
        for delta in [0u8, 1, 127, 254, 255] {
            for alpha in [AlphaPresentation::Raw, AlphaPresentation::Inverted] {
                assert_eq!(alpha.recover(alpha.render(delta)), Some(delta));
            }
            assert_eq!(AlphaPresentation::ForceOpaque.render(delta), 255);
        }
        assert_eq!(AlphaPresentation::ForceOpaque.recover(255), None);
    }

    #[test]
    fn empty_grid_normalizes_to_zero() {
        assert_eq!(normalize_sum(0, 0, 10, false), 0.0);
        assert_eq!(normalize_sum(0, 10, 0, true), 0.0);
    }

    #[test]
    fn diff_selects_mode() {
        let a = solid(4, 4, [0, 0, 0, 255]);
        let b = solid(4, 4, [255, 255, 255, 255]);

        let ratio_only = diff(&a, &b, &DiffOptions::default()).unwrap();
        assert!(ratio_only.diff_image.is_none());
        assert_eq!(ratio_only.ratio, 0.75);

        let options = DiffOptions {
            generate_image: true,
            ..DiffOptions::default()
        };
        let with_image = diff(&a, &b, &options).unwrap();
        assert_eq!(with_image.ratio, 0.75);
        let image = with_image.diff_image.unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[test]
    fn diff_returns_no_ratio_on_mismatch() {
        let options = DiffOptions {
            generate_image: true,
            ..DiffOptions::default()
        };
        let result = diff(&solid(3, 3, [0; 4]), &solid(4, 4, [0; 4]), &options);
        assert!(matches!(result, Err(DiffError::DimensionMismatch { .. })));
    }
}
