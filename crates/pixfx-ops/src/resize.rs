//! Image resize and resampling.
//!
//! Separable two-pass resampling (horizontal, then vertical) with a choice
//! of reconstruction kernel.
//!
//! # Kernels
//!
//! - [`ResampleFilter::Nearest`] - Fastest, no interpolation (blocky)
//! - [`ResampleFilter::Bilinear`] - Triangle (smooth but blurry)
//! - [`ResampleFilter::Bicubic`] - Mitchell-Netravali (B = C = 1/3)
//! - [`ResampleFilter::Lanczos3`] - Sinc-windowed, best for downscaling
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{Filter, ResampleFilter, ResizeFilter};
//!
//! let img = ImageAdapter::filled(16, 16, Color::WHITE);
//! let out = ResizeFilter::new(32, 8, ResampleFilter::Lanczos3).process(&img).unwrap();
//! assert_eq!(out.dimensions(), (32, 8));
//! ```

use std::fmt;
use std::str::FromStr;

use pixfx_core::{Color, ImageAdapter};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::parallel::build_rows;
use crate::{Filter, OpsError, OpsResult};

/// Reconstruction kernel for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Bicubic interpolation (sharper than bilinear).
    #[default]
    Bicubic,
    /// Lanczos-3 (high quality, best for downscaling).
    Lanczos3,
}

impl ResampleFilter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f64 {
        match self {
            ResampleFilter::Nearest => 0.5,
            ResampleFilter::Bilinear => 1.0,
            ResampleFilter::Bicubic => 2.0,
            ResampleFilter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f64) -> f64 {
        match self {
            ResampleFilter::Nearest => nearest_weight(x),
            ResampleFilter::Bilinear => bilinear_weight(x),
            ResampleFilter::Bicubic => mitchell_weight(x),
            ResampleFilter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "triangle" => Ok(Self::Bilinear),
            "bicubic" | "mitchell" => Ok(Self::Bicubic),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown resample filter '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nearest => "Nearest",
            Self::Bilinear => "Bilinear",
            Self::Bicubic => "Bicubic",
            Self::Lanczos3 => "Lanczos3",
        })
    }
}

#[inline]
fn nearest_weight(x: f64) -> f64 {
    // Half-open so a sample exactly between two pixels picks one of them.
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

#[inline]
fn bilinear_weight(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

#[inline]
fn mitchell_weight(x: f64) -> f64 {
    const B: f64 = 1.0 / 3.0;
    const C: f64 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

#[inline]
fn lanczos_weight(x: f64, a: f64) -> f64 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f64::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Resizes an image to `dst_w x dst_h`.
///
/// Empty source pixels contribute as transparent black.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] for a zero destination size.
pub fn resize(
    src: &ImageAdapter,
    dst_w: usize,
    dst_h: usize,
    filter: ResampleFilter,
) -> OpsResult<ImageAdapter> {
    trace!(src_w = src.width(), src_h = src.height(), dst_w, dst_h, %filter, "resize");
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }
    if src.is_empty() {
        return Err(OpsError::InvalidDimensions("source size must be > 0".into()));
    }
    if src.dimensions() == (dst_w, dst_h) {
        return Ok(src.clone());
    }

    let (src_w, src_h) = src.dimensions();
    let pixels: Vec<Color> = src.as_slice().iter().map(|c| c.or_transparent()).collect();

    // Two-pass separable resize: horizontal then vertical
    let temp = resize_horizontal(&pixels, src_w, src_h, dst_w, filter);
    let result = resize_vertical(&temp, dst_w, src_h, dst_h, filter);

    Ok(ImageAdapter::from_colors_with_depth(
        dst_w,
        dst_h,
        result,
        src.depth(),
    )?)
}

/// Weighted taps for one destination coordinate.
fn taps(dst: usize, src_len: usize, scale: f64, filter: ResampleFilter) -> Vec<(usize, f64)> {
    let support = filter.support() * scale.max(1.0);
    let center = (dst as f64 + 0.5) * scale - 0.5;
    let lo = ((center - support).floor().max(0.0)) as usize;
    let hi = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);

    let mut out = Vec::with_capacity(hi.saturating_sub(lo) + 1);
    let mut weight_sum = 0.0;
    for s in lo..=hi {
        let w = filter.weight((s as f64 - center) / scale.max(1.0));
        if w != 0.0 {
            out.push((s, w));
            weight_sum += w;
        }
    }
    if weight_sum.abs() < 1e-12 {
        // Degenerate window: fall back to the closest source sample.
        let nearest = (center.round().max(0.0) as usize).min(src_len - 1);
        return vec![(nearest, 1.0)];
    }
    for tap in &mut out {
        tap.1 /= weight_sum;
    }
    out
}

fn resize_horizontal(
    src: &[Color],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    filter: ResampleFilter,
) -> Vec<Color> {
    let scale = src_w as f64 / dst_w as f64;
    let columns: Vec<Vec<(usize, f64)>> =
        (0..dst_w).map(|x| taps(x, src_w, scale, filter)).collect();

    build_rows(dst_w, src_h, |y, row| {
        let src_row = &src[y * src_w..(y + 1) * src_w];
        for (px, column) in row.iter_mut().zip(&columns) {
            let mut sum = Color::TRANSPARENT;
            for &(sx, w) in column {
                sum = sum + src_row[sx] * w;
            }
            *px = sum;
        }
    })
}

fn resize_vertical(
    src: &[Color],
    src_w: usize,
    src_h: usize,
    dst_h: usize,
    filter: ResampleFilter,
) -> Vec<Color> {
    let scale = src_h as f64 / dst_h as f64;
    let rows: Vec<Vec<(usize, f64)>> = (0..dst_h).map(|y| taps(y, src_h, scale, filter)).collect();

    build_rows(src_w, dst_h, |y, row| {
        for (x, px) in row.iter_mut().enumerate() {
            let mut sum = Color::TRANSPARENT;
            for &(sy, w) in &rows[y] {
                sum = sum + src[sy * src_w + x] * w;
            }
            *px = sum;
        }
    })
}

/// Resamples the image to a fixed size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeFilter {
    /// Destination width.
    pub width: usize,
    /// Destination height.
    pub height: usize,
    /// Reconstruction kernel.
    pub filter: ResampleFilter,
}

impl Default for ResizeFilter {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            filter: ResampleFilter::Bicubic,
        }
    }
}

impl ResizeFilter {
    /// Resize to `width x height`.
    pub fn new(width: usize, height: usize, filter: ResampleFilter) -> Self {
        Self {
            width,
            height,
            filter,
        }
    }
}

impl Filter for ResizeFilter {
    fn name(&self) -> &'static str {
        "Resize"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        // A zero dimension keeps the source aspect ratio.
        let (w, h) = match (self.width, self.height) {
            (0, 0) => return Ok(source.clone()),
            (0, h) => (
                ((source.width() * h) as f64 / source.height() as f64).round().max(1.0) as usize,
                h,
            ),
            (w, 0) => (
                w,
                ((source.height() * w) as f64 / source.width() as f64).round().max(1.0) as usize,
            ),
            (w, h) => (w, h),
        };
        resize(source, w, h, self.filter)
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Width", "Output width (0 keeps the aspect ratio)", ParamValue::Int(self.width as i64)),
            Param::new("Height", "Output height (0 keeps the aspect ratio)", ParamValue::Int(self.height as i64)),
            Param::new("Filter", "Nearest, Bilinear, Bicubic or Lanczos3", ParamValue::text(self.filter)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Width" => self.width = value.into_usize(name)?,
            "Height" => self.height = value.into_usize(name)?,
            "Filter" => self.filter = value.into_enum(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_resize_uniform_stays_uniform() {
        let c = Color::rgb(0.2, 0.6, 0.4).quantize();
        let img = ImageAdapter::filled(10, 7, c);
        for filter in [
            ResampleFilter::Nearest,
            ResampleFilter::Bilinear,
            ResampleFilter::Bicubic,
            ResampleFilter::Lanczos3,
        ] {
            let out = resize(&img, 23, 4, filter).unwrap();
            assert_eq!(out.dimensions(), (23, 4));
            assert_eq!(out.pixel(11, 2), c, "{filter}");
        }
    }

    #[test]
    fn test_nearest_upscale_duplicates() {
        let mut img = ImageAdapter::filled(2, 1, Color::BLACK);
        img.set(1, 0, Color::WHITE);
        let out = resize(&img, 4, 1, ResampleFilter::Nearest).unwrap();
        assert_eq!(out.pixel(0, 0), Color::BLACK);
        assert_eq!(out.pixel(1, 0), Color::BLACK);
        assert_eq!(out.pixel(2, 0), Color::WHITE);
        assert_eq!(out.pixel(3, 0), Color::WHITE);
    }

    #[test]
    fn test_zero_destination() {
        let img = ImageAdapter::new(4, 4);
        assert!(resize(&img, 0, 4, ResampleFilter::Bilinear).is_err());
    }

    #[test]
    fn test_aspect_ratio() {
        let img = ImageAdapter::new(40, 20);
        let out = ResizeFilter::new(10, 0, ResampleFilter::Bilinear).process(&img).unwrap();
        assert_eq!(out.dimensions(), (10, 5));
    }

    #[test]
    fn test_kernel_weights() {
        assert_abs_diff_eq!(mitchell_weight(0.0), 8.0 / 9.0, epsilon = 1e-12);
        assert_eq!(lanczos_weight(0.0, 3.0), 1.0);
        assert_abs_diff_eq!(lanczos_weight(1.0, 3.0), 0.0, epsilon = 1e-12);
        assert_eq!(bilinear_weight(0.5), 0.5);
    }
}
