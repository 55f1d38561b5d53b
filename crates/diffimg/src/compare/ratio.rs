use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{check_dimensions, normalize_sum};
use crate::DiffError;
use crate::channel::{Color, channel_delta, extract_color};
use crate::parallel;

/// Sum of a delta's counted channels.
///
/// Example: `(100, 100, 180, 255)` vs `(120, 100, 100, 255)` gives a delta of
/// `(20, 0, 80, 0)`, summing to 100.
pub(crate) fn delta_sum(delta: Color, ignore_alpha: bool) -> u64 {
    let Rgba([r, g, b, a]) = delta;
    let rgb = u64::from(r) + u64::from(g) + u64::from(b);
    if ignore_alpha { rgb } else { rgb + u64::from(a) }
}

/// Difference ratio of two grids without rendering a diff image.
pub fn compute_ratio(
    left: &RgbaImage,
    right: &RgbaImage,
    ignore_alpha: bool,
) -> Result<f64, DiffError> {
    check_dimensions(left, right)?;
    let (w, h) = left.dimensions();

    let sum = parallel::sum_rows(w, h, |y| {
        (0..w)
            .map(|x| {
                let delta = channel_delta(extract_color(left, x, y), extract_color(right, x, y));
                delta_sum(delta, ignore_alpha)
            })
            .sum()
    });

    let ratio = normalize_sum(sum, w, h, ignore_alpha);
    debug!(sum, ratio, ignore_alpha, "computed ratio");
    Ok(ratio)
}
