//! Scalar interpolation helpers shared by the samplers and filters.
//!
//! ```rust
//! use pixfx_math::{lerp, keys_cubic, snap};
//!
//! assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
//! assert_eq!(keys_cubic(0.0, -0.5), 1.0);
//! assert_eq!(snap(2.0000000001, 1e-9), 2.0);
//! ```

/// Linear interpolation between two values.
///
/// Returns `a` when `t = 0.0`, and `b` when `t = 1.0`.
/// For values outside [0, 1], the result is extrapolated.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Inverse linear interpolation. Returns 0 when `a == b`.
#[inline]
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if a == b { 0.0 } else { (value - a) / (b - a) }
}

/// Clamps a value to [0, 1].
#[inline]
pub fn saturate(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Fractional part, always in [0, 1).
#[inline]
pub fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// Rounds `x` to the nearest integer if it lies within `eps` of it.
///
/// Inverse-mapped coordinates pick up `1e-15`-scale error from
/// trigonometry; snapping keeps lattice hits exact.
#[inline]
pub fn snap(x: f64, eps: f64) -> f64 {
    let r = x.round();
    if (x - r).abs() <= eps { r } else { x }
}

/// Keys cubic convolution kernel with parameter `a`, evaluated at `|x|`.
///
/// `a = -0.5` is the Catmull-Rom variant. Support is `[0, 2)`.
#[inline]
pub fn keys_cubic(x: f64, a: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a
    } else {
        0.0
    }
}

/// Mirrors an out-of-range index back into `[0, n)` by folding.
///
/// Even folds keep the direction, odd folds reverse it, so the sequence
/// for `n = 3` reads `... 1 2 | 2 1 0 | 0 1 2 | 2 1 0 ...`.
#[inline]
pub fn fold_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let q = i.div_euclid(n);
    let r = i.rem_euclid(n);
    if q % 2 == 0 { r as usize } else { (n - 1 - r) as usize }
}

/// Reflects an index about the edge pixels: `-1 -> 1`, `n -> n - 2`.
///
/// Valid for `i` in `(-n, 2n - 1)`; outside that range the result is
/// clamped.
#[inline]
pub fn reflect_index(i: isize, n: usize) -> usize {
    let last = n as isize - 1;
    let j = if i < 0 {
        -i
    } else if i > last {
        2 * last - i
    } else {
        i
    };
    j.clamp(0, last.max(0)) as usize
}

/// Clamps an index to `[0, n)`.
#[inline]
pub fn clamp_index(i: isize, n: usize) -> usize {
    i.clamp(0, n as isize - 1) as usize
}
