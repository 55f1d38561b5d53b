//! Row-sharded dispatch for the per-pixel passes.
//!
//! Small images run on the calling thread. At or above
//! [`PARALLEL_THRESHOLD`] pixels the rows are spread over the rayon pool.
//! Each row is independent and partial sums are plain `u64` additions, so
//! both dispatches produce identical results.

use rayon::prelude::*;

/// Pixel count at which row work moves to the rayon pool.
pub(crate) const PARALLEL_THRESHOLD: u64 = 1 << 20;

fn is_large(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) >= PARALLEL_THRESHOLD
}

/// Sum `row_sum(y)` over every row of a `width x height` grid.
pub(crate) fn sum_rows<F>(width: u32, height: u32, row_sum: F) -> u64
where
    F: Fn(u32) -> u64 + Sync,
{
    if is_large(width, height) {
        (0..height).into_par_iter().map(&row_sum).sum()
    } else {
        (0..height).map(row_sum).sum()
    }
}

/// Call `f(y, row)` for every row of an interleaved RGBA8 buffer.
pub(crate) fn for_each_row_mut<F>(buf: &mut [u8], width: u32, height: u32, f: F)
where
    F: Fn(u32, &mut [u8]) + Sync,
{
    let row_len = width as usize * 4;
    if row_len == 0 {
        return;
    }
    if is_large(width, height) {
        buf.par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y as u32, row));
    } else {
        for (y, row) in buf.chunks_exact_mut(row_len).enumerate() {
            f(y as u32, row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_rows_matches_across_dispatch() {
        let row_sum = |y: u32| u64::from(y) * 3;
        let small = sum_rows(10, 100, row_sum);
        assert_eq!(small, (0..100u64).map(|y| y * 3).sum::<u64>());

        // 2048 x 1024 crosses the threshold.
        let large = sum_rows(2048, 1024, row_sum);
        assert_eq!(large, (0..1024u64).map(|y| y * 3).sum::<u64>());
    }

    #[test]
    fn for_each_row_mut_visits_every_row() {
        let (w, h) = (3u32, 5u32);
        let mut buf = vec![0u8; (w * h * 4) as usize];
        for_each_row_mut(&mut buf, w, h, |y, row| row.fill(y as u8));
        for (y, row) in buf.chunks_exact(w as usize * 4).enumerate() {
            assert!(row.iter().all(|&v| v == y as u8));
        }
    }

    #[test]
    fn for_each_row_mut_zero_width_is_noop() {
        let mut buf: Vec<u8> = Vec::new();
        for_each_row_mut(&mut buf, 0, 4, |_, _| panic!("no rows expected"));
    }
}
