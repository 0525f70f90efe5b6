//! Point samplers used by the affine transform engine.
//!
//! Coordinates are lattice coordinates: pixel `(i, j)` sits exactly at
//! `(i, j)`, so the valid sampling area is `[0, width-1] x [0, height-1]`.
//! Outside it every sampler returns the caller's "unassigned" color, or
//! [`Color::EMPTY`] when none was given.
//!
//! # Samplers
//!
//! - [`Interpolation::Nearest`] - Rounded lattice point
//! - [`Interpolation::Bilinear`] - Four neighbours, 1024-step weight ramp
//! - [`Interpolation::Bicubic`] - 4x4 neighbourhood, radial Keys cubic (a = -0.5)
//!
//! Empty neighbours are never blended in; see [`sample_bilinear`] and
//! [`sample_bicubic`] for how each sampler renormalizes.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::Interpolation;
//!
//! let img = ImageAdapter::filled(4, 4, Color::WHITE);
//! assert_eq!(Interpolation::Bilinear.sample(&img, 1.0, 2.0, None), Color::WHITE);
//! assert!(Interpolation::Bilinear.sample(&img, -1.0, 0.0, None).is_empty());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use pixfx_core::{Color, ImageAdapter};
use pixfx_math::keys_cubic;

use crate::OpsError;

/// Number of entries in the weight lookup tables.
pub const TABLE_SIZE: usize = 1024;

/// Keys cubic parameter (Catmull-Rom).
pub const BICUBIC_A: f64 = -0.5;

/// Interpolation method for point sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Nearest lattice point.
    Nearest,
    /// Bilinear over the four surrounding pixels.
    #[default]
    Bilinear,
    /// Bicubic over the surrounding 4x4 pixels.
    Bicubic,
}

impl Interpolation {
    /// Samples `image` at lattice coordinates (x, y).
    #[inline]
    pub fn sample(&self, image: &ImageAdapter, x: f64, y: f64, unassigned: Option<Color>) -> Color {
        match self {
            Interpolation::Nearest => sample_nearest(image, x, y, unassigned),
            Interpolation::Bilinear => sample_bilinear(image, x, y, unassigned),
            Interpolation::Bicubic => sample_bicubic(image, x, y, unassigned),
        }
    }

    /// Method name.
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "Nearest",
            Interpolation::Bilinear => "Bilinear",
            Interpolation::Bicubic => "Bicubic",
        }
    }
}

impl FromStr for Interpolation {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearestneighbor" => Ok(Interpolation::Nearest),
            "bilinear" | "linear" => Ok(Interpolation::Bilinear),
            "bicubic" | "cubic" => Ok(Interpolation::Bicubic),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown interpolation '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Linear ramp `ramp[i] = i / 1024`.
fn ramp() -> &'static [f64; TABLE_SIZE] {
    static RAMP: OnceLock<[f64; TABLE_SIZE]> = OnceLock::new();
    RAMP.get_or_init(|| std::array::from_fn(|i| i as f64 / TABLE_SIZE as f64))
}

/// Keys cubic sampled over distance `[0, 2)`.
fn cubic_table() -> &'static [f64; TABLE_SIZE] {
    static CUBIC: OnceLock<[f64; TABLE_SIZE]> = OnceLock::new();
    CUBIC.get_or_init(|| {
        std::array::from_fn(|i| keys_cubic(i as f64 * 2.0 / TABLE_SIZE as f64, BICUBIC_A))
    })
}

#[inline]
fn ramp_index(t: f64) -> usize {
    ((t * TABLE_SIZE as f64).floor().max(0.0) as usize).min(TABLE_SIZE - 1)
}

#[inline]
fn in_range(image: &ImageAdapter, x: f64, y: f64) -> bool {
    !image.is_empty()
        && x >= 0.0
        && y >= 0.0
        && x <= (image.width() - 1) as f64
        && y <= (image.height() - 1) as f64
}

/// Nearest-neighbour sample.
pub fn sample_nearest(image: &ImageAdapter, x: f64, y: f64, unassigned: Option<Color>) -> Color {
    let fallback = unassigned.unwrap_or(Color::EMPTY);
    if !in_range(image, x, y) {
        return fallback;
    }
    let px = (x.round() as usize).min(image.width() - 1);
    let py = (y.round() as usize).min(image.height() - 1);
    let c = image.pixel(px, py);
    if c.is_empty() { fallback } else { c }
}

/// Bilinear sample.
///
/// Fractions are quantized through the ramp table. When a neighbour is
/// empty the sample falls back to distance weighting over the non-empty
/// neighbours (weight `1 - ramp[d * 1024]`); an empty top-left neighbour
/// yields the unassigned color.
pub fn sample_bilinear(image: &ImageAdapter, x: f64, y: f64, unassigned: Option<Color>) -> Color {
    let fallback = unassigned.unwrap_or(Color::EMPTY);
    if !in_range(image, x, y) {
        return fallback;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    if p00.is_empty() {
        return fallback;
    }

    let table = ramp();
    if !(p10.is_empty() || p01.is_empty() || p11.is_empty()) {
        let wx = table[ramp_index(x - x0 as f64)];
        let wy = table[ramp_index(y - y0 as f64)];
        let top = p00 * (1.0 - wx) + p10 * wx;
        let bottom = p01 * (1.0 - wx) + p11 * wx;
        return top * (1.0 - wy) + bottom * wy;
    }

    let neighbours = [
        (x0, y0, p00),
        (x1, y0, p10),
        (x0, y1, p01),
        (x1, y1, p11),
    ];
    let mut sum = Color::TRANSPARENT;
    let mut total = 0.0;
    for (nx, ny, c) in neighbours {
        if c.is_empty() {
            continue;
        }
        let d = ((x - nx as f64).powi(2) + (y - ny as f64).powi(2)).sqrt();
        let w = 1.0 - table[ramp_index(d)];
        sum = sum + c * w;
        total += w;
    }
    if total <= 0.0 { p00 } else { sum / total }
}

/// Bicubic sample using a radial Keys kernel over offsets `-1..=2`.
///
/// Neighbour indices are clamped to the image; empty neighbours are
/// skipped and the remaining weights renormalized. A zero weight total
/// falls back to [`sample_nearest`].
pub fn sample_bicubic(image: &ImageAdapter, x: f64, y: f64, unassigned: Option<Color>) -> Color {
    let fallback = unassigned.unwrap_or(Color::EMPTY);
    if !in_range(image, x, y) {
        return fallback;
    }

    let table = cubic_table();
    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;
    let max_x = image.width() as isize - 1;
    let max_y = image.height() as isize - 1;

    let mut sum = Color::TRANSPARENT;
    let mut total = 0.0;
    for dy in -1..=2 {
        let ny = (y0 + dy).clamp(0, max_y);
        for dx in -1..=2 {
            let nx = (x0 + dx).clamp(0, max_x);
            let c = image.pixel(nx as usize, ny as usize);
            if c.is_empty() {
                continue;
            }
            // Distance to the unclamped lattice point keeps the kernel shape at edges.
            let d = ((x - (x0 + dx) as f64).powi(2) + (y - (y0 + dy) as f64).powi(2)).sqrt();
            if d >= 2.0 {
                continue;
            }
            let w = table[ramp_index(d / 2.0)];
            sum = sum + c * w;
            total += w;
        }
    }

    if total.abs() < 1e-12 {
        return sample_nearest(image, x, y, unassigned);
    }
    sum / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gradient(w: usize, h: usize) -> ImageAdapter {
        ImageAdapter::new(w, h).map_indexed(|x, y, _| {
            Color::from_argb8(255, (x * 40) as u8, (y * 40) as u8, 100)
        })
    }

    #[test]
    fn test_bilinear_lattice_exact() {
        let img = gradient(5, 4);
        for y in 0..4 {
            for x in 0..5 {
                let s = sample_bilinear(&img, x as f64, y as f64, None);
                assert_eq!(s, img.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        let img = gradient(2, 1);
        let s = sample_bilinear(&img, 0.5, 0.0, None);
        assert_abs_diff_eq!(s.r, 20.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range() {
        let img = gradient(3, 3);
        assert!(sample_bilinear(&img, 2.5, 0.0, None).is_empty());
        assert_eq!(
            sample_bicubic(&img, 0.0, -0.1, Some(Color::WHITE)),
            Color::WHITE
        );
        assert!(sample_nearest(&img, 3.0, 0.0, None).is_empty());
    }

    #[test]
    fn test_bilinear_empty_top_left() {
        let mut img = gradient(2, 2);
        img.set(0, 0, Color::EMPTY);
        let red = Color::rgb(1.0, 0.0, 0.0);
        assert_eq!(sample_bilinear(&img, 0.5, 0.5, Some(red)), red);
    }

    #[test]
    fn test_bilinear_skips_empty_neighbour() {
        let mut img = ImageAdapter::new(2, 2);
        img.set(0, 0, Color::rgb(1.0, 0.0, 0.0));
        img.set(1, 0, Color::rgb(0.0, 1.0, 0.0));
        img.set(0, 1, Color::rgb(0.0, 0.0, 1.0));
        img.set(1, 1, Color::EMPTY);
        let s = sample_bilinear(&img, 0.25, 0.0, None);

        // Distances 0.25, 0.75 and ~1.03 (clamped to the last ramp entry).
        let w00 = 1.0 - 256.0 / 1024.0;
        let w10 = 1.0 - 768.0 / 1024.0;
        let w01 = 1.0 - 1023.0 / 1024.0;
        let total = w00 + w10 + w01;
        assert_abs_diff_eq!(s.r, w00 / total, epsilon = 1e-12);
        assert_abs_diff_eq!(s.g, w10 / total, epsilon = 1e-12);
        assert_abs_diff_eq!(s.b, w01 / total, epsilon = 1e-12);
        assert_abs_diff_eq!(s.a, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bicubic_uniform() {
        let img = ImageAdapter::filled(6, 6, Color::rgb(0.4, 0.4, 0.4).quantize());
        let s = sample_bicubic(&img, 2.3, 3.7, None);
        assert_abs_diff_eq!(s.r, img.pixel(0, 0).r, epsilon = 1e-9);
        assert_abs_diff_eq!(s.a, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nearest_rounds() {
        let img = gradient(3, 3);
        assert_eq!(sample_nearest(&img, 1.6, 0.4, None), img.pixel(2, 0));
    }

    #[test]
    fn test_interpolation_parse() {
        assert_eq!("Bicubic".parse::<Interpolation>().unwrap(), Interpolation::Bicubic);
        assert!("sinc".parse::<Interpolation>().is_err());
    }

    #[test]
    fn test_tables() {
        assert_eq!(ramp()[512], 0.5);
        assert_eq!(cubic_table()[0], 1.0);
        assert_abs_diff_eq!(cubic_table()[512], 0.0, epsilon = 1e-12);
    }
}
