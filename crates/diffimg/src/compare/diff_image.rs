use image::{Rgba, RgbaImage};
use tracing::debug;

use super::ratio::delta_sum;
use super::{AlphaPresentation, DiffOptions, check_dimensions, normalize_sum};
use crate::DiffError;
use crate::channel::{channel_delta, extract_color};
use crate::parallel;

/// A rendered diff: per-channel absolute deltas plus the alpha presentation
/// they were written with.
#[derive(Debug, Clone)]
pub struct DiffImage {
    image: RgbaImage,
    alpha: AlphaPresentation,
}

impl DiffImage {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn alpha(&self) -> AlphaPresentation {
        self.alpha
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Render the per-channel deltas of two grids into a new image.
///
/// RGB hold `|ΔR|, |ΔG|, |ΔB|`. Alpha follows
/// [`DiffOptions::effective_alpha`]. Inputs are only read.
pub fn create_diff_image(
    left: &RgbaImage,
    right: &RgbaImage,
    options: &DiffOptions,
) -> Result<DiffImage, DiffError> {
    check_dimensions(left, right)?;
    let alpha = options.effective_alpha()?;
    let (w, h) = left.dimensions();

    let mut image = RgbaImage::new(w, h);
    parallel::for_each_row_mut(&mut image, w, h, |y, row| {
        for (x, out) in (0..w).zip(row.chunks_exact_mut(4)) {
            let Rgba([r, g, b, a]) =
                channel_delta(extract_color(left, x, y), extract_color(right, x, y));
            out.copy_from_slice(&[r, g, b, alpha.render(a)]);
        }
    });

    debug!(width = w, height = h, ?alpha, "rendered diff image");
    Ok(DiffImage { image, alpha })
}

/// Difference ratio read back from a rendered diff image.
///
/// Stored channel values are summed directly. When alpha counts, the true
/// delta is recovered from the stored value first, which fails for a
/// force-opaque image.
pub fn ratio_from_diff_image(diff: &DiffImage, ignore_alpha: bool) -> Result<f64, DiffError> {
    if !ignore_alpha && diff.alpha == AlphaPresentation::ForceOpaque {
        return Err(DiffError::InvalidOptions(
            "diff image was rendered force-opaque; alpha differences are not recoverable"
                .to_string(),
        ));
    }

    let (w, h) = diff.dimensions();
    let sum = parallel::sum_rows(w, h, |y| {
        (0..w)
            .map(|x| {
                let Rgba([r, g, b, stored]) = extract_color(&diff.image, x, y);
                let a = diff.alpha.recover(stored).unwrap_or(0);
                delta_sum(Rgba([r, g, b, a]), ignore_alpha)
            })
            .sum()
    });

    let ratio = normalize_sum(sum, w, h, ignore_alpha);
    debug!(sum, ratio, ignore_alpha, "ratio from diff image");
    Ok(ratio)
}
