//! Row-parallel loops over destination buffers.
//!
//! With the `parallel` feature rows are distributed over the rayon pool;
//! without it they run in order. Each row is computed independently, so
//! both builds produce identical output.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use pixfx_core::Color;

/// Calls `f(y, row)` for every `width`-long row of `dst`.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_row<F>(dst: &mut [Color], width: usize, f: F)
where
    F: Fn(usize, &mut [Color]) + Sync + Send,
{
    if width == 0 {
        return;
    }
    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Calls `f(y, row)` for every `width`-long row of `dst` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_row<F>(dst: &mut [Color], width: usize, f: F)
where
    F: Fn(usize, &mut [Color]) + Sync + Send,
{
    if width == 0 {
        return;
    }
    for (y, row) in dst.chunks_mut(width).enumerate() {
        f(y, row);
    }
}

/// Allocates a `width x height` buffer and fills it row by row.
pub(crate) fn build_rows<F>(width: usize, height: usize, f: F) -> Vec<Color>
where
    F: Fn(usize, &mut [Color]) + Sync + Send,
{
    let mut dst = vec![Color::TRANSPARENT; width * height];
    for_each_row(&mut dst, width, f);
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rows_visits_every_row() {
        let buf = build_rows(3, 4, |y, row| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = Color::rgb(x as f64, y as f64, 0.0);
            }
        });
        assert_eq!(buf.len(), 12);
        assert_eq!(buf[3 * 2 + 1], Color::rgb(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_zero_width() {
        assert!(build_rows(0, 5, |_, _| {}).is_empty());
    }
}
