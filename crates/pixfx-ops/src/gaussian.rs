//! Separable Gaussian filtering and the radius-driven blur built on it.
//!
//! The kernel has half-length `L` and falloff `sigma`:
//!
//! ```text
//! w(i) = exp(-sigma * i^2 / L^2),  i in [-L, L],  normalized to sum 1
//! ```
//!
//! A horizontal pass is followed by a vertical pass, both on unclamped
//! values; the result is stored at the source depth once at the end.
//! Borders use the folded mirror of [`pixfx_math::fold_index`], which stays
//! valid for kernels wider than the image.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{BlurFilter, Filter};
//!
//! let img = ImageAdapter::filled(8, 8, Color::WHITE);
//! let out = BlurFilter::new(2.5).unwrap().process(&img).unwrap();
//! assert_eq!(out, img);
//! ```

use pixfx_core::{Color, ImageAdapter};
use pixfx_math::fold_index;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::parallel::build_rows;
use crate::{Filter, OpsError, OpsResult};

/// Kernel weight at distance `radius` relative to the center.
pub const DECIMATION_FACTOR: f64 = 0.1;

/// Kernel half-length as a multiple of the blur radius.
pub const CUTOFF: f64 = 1.4;

/// Largest accepted kernel half-length.
pub const MAX_HALF_LENGTH: usize = 4096;

/// Normalized weights for offsets `-half_length..=half_length`.
///
/// ```rust
/// use pixfx_ops::gaussian_weights;
///
/// let w = gaussian_weights(2, 1.0);
/// assert_eq!(w.len(), 5);
/// assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
pub fn gaussian_weights(half_length: usize, sigma: f64) -> Vec<f64> {
    if half_length == 0 {
        return vec![1.0];
    }
    let l2 = (half_length as f64).powi(2);
    let l = half_length as isize;
    let raw: Vec<f64> = (-l..=l)
        .map(|i| (-sigma * (i as f64).powi(2) / l2).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

/// Half-length and sigma of the Gaussian used for a blur `radius`.
///
/// Returns `(0, 0.0)` for a zero radius.
pub fn blur_kernel_shape(radius: f64) -> (usize, f64) {
    if radius <= 0.0 {
        return (0, 0.0);
    }
    let l = (CUTOFF * radius).ceil();
    let sigma = -DECIMATION_FACTOR.ln() * l * l / (radius * radius);
    (l as usize, sigma)
}

/// Checks a blur radius: finite, `>= 0`, with a kernel half-length of at
/// most [`MAX_HALF_LENGTH`].
pub(crate) fn check_radius(radius: f64) -> OpsResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(OpsError::InvalidParameter(format!(
            "radius must be >= 0, got {}",
            radius
        )));
    }
    if (CUTOFF * radius).ceil() > MAX_HALF_LENGTH as f64 {
        return Err(OpsError::InvalidParameter(format!(
            "radius {} needs a kernel half-length above {}",
            radius, MAX_HALF_LENGTH
        )));
    }
    Ok(())
}

/// Applies the separable Gaussian to every channel of `src`.
pub fn separable_gaussian(src: &ImageAdapter, half_length: usize, sigma: f64) -> ImageAdapter {
    let (width, height) = src.dimensions();
    trace!(width, height, half_length, sigma, "separable_gaussian");
    if half_length == 0 || src.is_empty() {
        return src.clone();
    }
    let weights = gaussian_weights(half_length, sigma);
    let l = half_length as isize;
    let input: Vec<Color> = src.as_slice().iter().map(|c| c.or_transparent()).collect();

    let horizontal = build_rows(width, height, |y, row| {
        let line = &input[y * width..(y + 1) * width];
        for (x, px) in row.iter_mut().enumerate() {
            let mut sum = Color::TRANSPARENT;
            for (k, w) in weights.iter().enumerate() {
                let sx = fold_index(x as isize + k as isize - l, width);
                sum = sum + line[sx] * *w;
            }
            *px = sum;
        }
    });

    let vertical = build_rows(width, height, |y, row| {
        for (x, px) in row.iter_mut().enumerate() {
            let mut sum = Color::TRANSPARENT;
            for (k, w) in weights.iter().enumerate() {
                let sy = fold_index(y as isize + k as isize - l, height);
                sum = sum + horizontal[sy * width + x] * *w;
            }
            *px = sum;
        }
    });

    ImageAdapter::from_colors_with_depth(width, height, vertical, src.depth())
        .unwrap_or_else(|_| src.clone())
}

/// Gaussian with explicit half-length and sigma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFilter {
    half_length: usize,
    sigma: f64,
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self {
            half_length: 2,
            sigma: 2.0,
        }
    }
}

impl GaussianFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a negative or non-finite
    /// sigma, or a half-length above [`MAX_HALF_LENGTH`].
    pub fn new(half_length: usize, sigma: f64) -> OpsResult<Self> {
        let mut f = Self::default();
        f.set_half_length(half_length)?;
        f.set_sigma(sigma)?;
        Ok(f)
    }

    /// Sets the kernel half-length.
    pub fn set_half_length(&mut self, half_length: usize) -> OpsResult<()> {
        if half_length > MAX_HALF_LENGTH {
            return Err(OpsError::InvalidParameter(format!(
                "half-length {} exceeds the maximum of {}",
                half_length, MAX_HALF_LENGTH
            )));
        }
        self.half_length = half_length;
        Ok(())
    }

    /// Sets sigma.
    pub fn set_sigma(&mut self, sigma: f64) -> OpsResult<()> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "sigma must be >= 0, got {}",
                sigma
            )));
        }
        self.sigma = sigma;
        Ok(())
    }

    /// Kernel half-length.
    pub fn half_length(&self) -> usize {
        self.half_length
    }

    /// Falloff.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Filter for GaussianFilter {
    fn name(&self) -> &'static str {
        "Gaussian"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        Ok(separable_gaussian(source, self.half_length, self.sigma))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("HalfLength", "Kernel half-length in pixels", ParamValue::Int(self.half_length as i64)),
            Param::new("Sigma", "Falloff: weight at the kernel edge is exp(-Sigma)", ParamValue::Double(self.sigma)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "HalfLength" => self.set_half_length(value.into_usize(name)?)?,
            "Sigma" => self.set_sigma(value.into_double(name)?)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

/// Blur whose kernel weight falls to [`DECIMATION_FACTOR`] at `radius` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlurFilter {
    radius: f64,
}

impl BlurFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a negative or non-finite
    /// radius, or one whose kernel would exceed [`MAX_HALF_LENGTH`].
    pub fn new(radius: f64) -> OpsResult<Self> {
        let mut f = Self::default();
        f.set_radius(radius)?;
        Ok(f)
    }

    /// Sets the radius in pixels.
    pub fn set_radius(&mut self, radius: f64) -> OpsResult<()> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    /// Radius in pixels.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Filter for BlurFilter {
    fn name(&self) -> &'static str {
        "Blur"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let (half_length, sigma) = blur_kernel_shape(self.radius);
        debug!(radius = self.radius, half_length, sigma, "blur kernel");
        Ok(separable_gaussian(source, half_length, sigma))
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("Radius", "Blur radius in pixels", ParamValue::Double(self.radius))]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Radius" => self.set_radius(value.into_double(name)?),
            _ => Err(OpsError::unknown_parameter(self.name(), name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn checker(w: usize, h: usize) -> ImageAdapter {
        ImageAdapter::new(w, h).map_indexed(|x, y, _| {
            if (x + y) % 2 == 0 { Color::WHITE } else { Color::BLACK }
        })
    }

    #[test]
    fn test_zero_radius_identity() {
        let img = checker(5, 4);
        assert_eq!(BlurFilter::new(0.0).unwrap().process(&img).unwrap(), img);
        assert_eq!(GaussianFilter::new(0, 3.0).unwrap().process(&img).unwrap(), img);
    }

    #[test]
    fn test_blur_shape() {
        let (l, sigma) = blur_kernel_shape(2.0);
        assert_eq!(l, 3);
        // Weight at distance == radius equals the decimation factor.
        assert_abs_diff_eq!((-sigma * 4.0 / 9.0).exp(), DECIMATION_FACTOR, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_symmetric() {
        let w = gaussian_weights(3, 2.0);
        assert_eq!(w.len(), 7);
        for i in 0..3 {
            assert_abs_diff_eq!(w[i], w[6 - i], epsilon = 1e-15);
        }
        assert!(w[3] > w[2]);
    }

    #[test]
    fn test_blur_smooths_checker() {
        let img = checker(8, 8);
        let out = BlurFilter::new(1.5).unwrap().process(&img).unwrap();
        let px = out.pixel(4, 4);
        assert!(px.r > 0.3 && px.r < 0.7, "{px}");
        assert_eq!(px.a, 1.0);
    }

    #[test]
    fn test_oversized_kernels_rejected() {
        assert!(BlurFilter::new(4e9).unwrap_err().is_invalid_argument());
        assert!(BlurFilter::new(2000.0).is_ok());

        let mut g = GaussianFilter::default();
        let err = g.set_param_text("HalfLength", "5000000000").unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(g.half_length(), 2);
        assert!(GaussianFilter::new(MAX_HALF_LENGTH + 1, 1.0).is_err());
    }

    #[test]
    fn test_shape_of_large_radius() {
        let (l, sigma) = blur_kernel_shape(2000.0);
        assert_eq!(l, 2800);
        assert!(sigma.is_finite());
        let (_, huge) = blur_kernel_shape(4e9);
        assert!(huge.is_finite());
    }

    #[test]
    fn test_kernel_wider_than_image() {
        let img = checker(2, 2);
        let out = GaussianFilter::new(5, 1.0).unwrap().process(&img).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
    }

    #[test]
    fn test_invalid_params() {
        assert!(BlurFilter::new(-1.0).is_err());
        assert!(GaussianFilter::new(2, f64::NAN).is_err());
        let mut f = BlurFilter::default();
        assert!(f.set_param("Radius", ParamValue::Int(2)).is_err());
        f.set_param_text("radius", "3").unwrap();
        assert_eq!(f.radius(), 3.0);
    }
}
