//! General 2D convolution.
//!
//! [`ConvolutionFilter`] reflects the image at its borders;
//! [`SaturateEdgeFilter`] replicates the edge pixels instead and requires an
//! odd kernel.
//!
//! Both follow the same alpha rule: if any pixel under the kernel is
//! transparent (or empty) the result is transparent, otherwise the result
//! keeps the center pixel's alpha.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{ConvolutionFilter, Filter, KernelPreset};
//!
//! let img = ImageAdapter::filled(5, 5, Color::rgb(0.2, 0.4, 0.6));
//! let out = ConvolutionFilter::preset(KernelPreset::Smooth).process(&img).unwrap();
//! assert_eq!(out, img);
//! ```

use pixfx_core::{Color, ImageAdapter};
use pixfx_math::{clamp_index, reflect_index};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::parallel::build_rows;
use crate::{Filter, Kernel, KernelPreset, OpsError, OpsResult};

/// How out-of-image taps are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Reflect about the edge pixel (`-1 -> 1`).
    Mirror,
    /// Replicate the edge pixel.
    Clamp,
}

/// Post-processing applied to each convolved color channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvolveOptions {
    /// Take the absolute value of the sum.
    pub abs: bool,
    /// Added after `abs`.
    pub bias: f64,
}

/// Convolves `src` with `kernel` (correlation order, anchor at the kernel center).
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] if the kernel is larger than the image.
pub fn convolve(
    src: &ImageAdapter,
    kernel: &Kernel,
    edge: EdgeMode,
    options: ConvolveOptions,
) -> OpsResult<ImageAdapter> {
    let (width, height) = src.dimensions();
    trace!(
        width,
        height,
        kernel_w = kernel.width(),
        kernel_h = kernel.height(),
        ?edge,
        "convolve"
    );
    kernel.require_fits(width, height)?;

    let (cx, cy) = kernel.center();
    let (kw, kh) = (kernel.width(), kernel.height());
    let resolve = |i: isize, n: usize| match edge {
        EdgeMode::Mirror => reflect_index(i, n),
        EdgeMode::Clamp => clamp_index(i, n),
    };

    let pixels = build_rows(width, height, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let center = src.pixel(x, y);
            if center.is_empty() {
                *out = Color::EMPTY;
                continue;
            }
            let mut sum = Color::TRANSPARENT;
            let mut any_transparent = false;
            for ky in 0..kh {
                let sy = resolve(y as isize + ky as isize - cy as isize, height);
                for kx in 0..kw {
                    let sx = resolve(x as isize + kx as isize - cx as isize, width);
                    let c = src.pixel(sx, sy);
                    if c.is_empty() || c.a <= 0.0 {
                        any_transparent = true;
                    }
                    sum = sum + c.or_transparent() * kernel.weight(kx, ky);
                }
            }
            let finish = |v: f64| {
                let v = if options.abs { v.abs() } else { v };
                v + options.bias
            };
            let alpha = if any_transparent { 0.0 } else { center.a };
            *out = Color::new(alpha, finish(sum.r), finish(sum.g), finish(sum.b));
        }
    });

    Ok(ImageAdapter::from_colors_with_depth(
        width,
        height,
        pixels,
        src.depth(),
    )?)
}

fn kernel_params(kernel: &Kernel, preset: Option<KernelPreset>, options: ConvolveOptions) -> Vec<Param> {
    vec![
        Param::new("Kernel", "Kernel weights, rows separated by ';'", ParamValue::Kernel(kernel.clone())),
        Param::new(
            "Preset",
            "Smooth, Sharpen, EdgeDetect, Emboss, SobelX, SobelY or Identity",
            ParamValue::Text(preset.map(|p| p.name().to_string()).unwrap_or_else(|| "Custom".into())),
        ),
        Param::new("Abs", "Take the absolute value of each sum", ParamValue::Bool(options.abs)),
        Param::new("Bias", "Offset added to each sum", ParamValue::Double(options.bias)),
    ]
}

/// Convolution with mirrored borders.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionFilter {
    kernel: Kernel,
    preset: Option<KernelPreset>,
    /// Abs and bias.
    pub options: ConvolveOptions,
}

impl Default for ConvolutionFilter {
    fn default() -> Self {
        Self::preset(KernelPreset::Smooth)
    }
}

impl ConvolutionFilter {
    /// Filter with a custom kernel.
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            preset: None,
            options: ConvolveOptions::default(),
        }
    }

    /// Filter with a named kernel.
    pub fn preset(preset: KernelPreset) -> Self {
        Self {
            kernel: preset.kernel(),
            preset: Some(preset),
            options: ConvolveOptions::default(),
        }
    }

    /// Sets abs and bias.
    pub fn with_options(mut self, options: ConvolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The active kernel.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

impl Filter for ConvolutionFilter {
    fn name(&self) -> &'static str {
        "Convolution"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        convolve(source, &self.kernel, EdgeMode::Mirror, self.options)
    }

    fn params(&self) -> Vec<Param> {
        kernel_params(&self.kernel, self.preset, self.options)
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Kernel" => {
                self.kernel = value.into_kernel(name)?;
                self.preset = None;
            }
            "Preset" => {
                let preset: KernelPreset = value.into_enum(name)?;
                self.kernel = preset.kernel();
                self.preset = Some(preset);
            }
            "Abs" => self.options.abs = value.into_bool(name)?,
            "Bias" => self.options.bias = value.into_double(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

/// Convolution with replicated borders; the kernel must be odd-sized.
#[derive(Debug, Clone, PartialEq)]
pub struct SaturateEdgeFilter {
    kernel: Kernel,
    preset: Option<KernelPreset>,
    /// Abs and bias.
    pub options: ConvolveOptions,
}

impl Default for SaturateEdgeFilter {
    fn default() -> Self {
        Self {
            kernel: Kernel::smooth(),
            preset: Some(KernelPreset::Smooth),
            options: ConvolveOptions::default(),
        }
    }
}

impl SaturateEdgeFilter {
    /// Filter with a custom kernel.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for an even dimension.
    pub fn new(kernel: Kernel) -> OpsResult<Self> {
        kernel.require_odd()?;
        Ok(Self {
            kernel,
            preset: None,
            options: ConvolveOptions::default(),
        })
    }
}

impl Filter for SaturateEdgeFilter {
    fn name(&self) -> &'static str {
        "SaturateEdge"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        self.kernel.require_odd()?;
        convolve(source, &self.kernel, EdgeMode::Clamp, self.options)
    }

    fn params(&self) -> Vec<Param> {
        kernel_params(&self.kernel, self.preset, self.options)
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Kernel" => {
                let kernel = value.into_kernel(name)?;
                kernel.require_odd()?;
                self.kernel = kernel;
                self.preset = None;
            }
            "Preset" => {
                let preset: KernelPreset = value.into_enum(name)?;
                self.kernel = preset.kernel();
                self.preset = Some(preset);
            }
            "Abs" => self.options.abs = value.into_bool(name)?,
            "Bias" => self.options.bias = value.into_double(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(w: usize, h: usize) -> ImageAdapter {
        ImageAdapter::new(w, h).map_indexed(|x, y, _| {
            Color::from_argb8(255, (x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x * y) % 256) as u8)
        })
    }

    #[test]
    fn test_identity_kernel() {
        let img = pattern(6, 5);
        let out = ConvolutionFilter::new(Kernel::identity()).process(&img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_smooth_uniform() {
        let c = Color::from_argb8(255, 10, 200, 77);
        let img = ImageAdapter::filled(4, 4, c);
        let out = ConvolutionFilter::preset(KernelPreset::Smooth).process(&img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let img = pattern(2, 2);
        let err = ConvolutionFilter::preset(KernelPreset::Smooth)
            .process(&img)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_transparent_footprint_zeroes_alpha() {
        let mut img = ImageAdapter::filled(5, 5, Color::WHITE);
        img.set(2, 2, Color::TRANSPARENT);
        let out = ConvolutionFilter::preset(KernelPreset::Smooth).process(&img).unwrap();
        assert_eq!(out.pixel(1, 1).a, 0.0);
        assert_eq!(out.pixel(4, 4).a, 1.0);
    }

    #[test]
    fn test_mirror_vs_clamp_edges() {
        // 1x3 column [0, 0, 1]; only the bottom pixel tells the modes apart.
        let mut img = ImageAdapter::filled(1, 3, Color::BLACK);
        img.set(0, 2, Color::WHITE);
        let k = Kernel::new(1, 3, vec![1.0 / 3.0; 3]).unwrap();

        let mirror = convolve(&img, &k, EdgeMode::Mirror, ConvolveOptions::default()).unwrap();
        let clamp = convolve(&img, &k, EdgeMode::Clamp, ConvolveOptions::default()).unwrap();
        // Mirror: taps (1, 2, 1) -> 1/3. Clamp: taps (1, 2, 2) -> 2/3.
        assert_eq!(mirror.pixel(0, 2).to_argb8().r, 85);
        assert_eq!(clamp.pixel(0, 2).to_argb8().r, 170);
    }

    #[test]
    fn test_abs_and_bias() {
        let mut img = ImageAdapter::filled(3, 3, Color::BLACK);
        img.set(0, 1, Color::WHITE);
        let k = Kernel::sobel_x();
        let plain = convolve(&img, &k, EdgeMode::Clamp, ConvolveOptions::default()).unwrap();
        let abs = convolve(&img, &k, EdgeMode::Clamp, ConvolveOptions { abs: true, bias: 0.0 }).unwrap();
        assert_eq!(plain.pixel(1, 1).r, 0.0);
        assert_eq!(abs.pixel(1, 1).r, 1.0);

        let biased = convolve(&img, &Kernel::identity(), EdgeMode::Mirror, ConvolveOptions { abs: false, bias: 0.5 }).unwrap();
        assert_eq!(biased.pixel(2, 2).to_argb8().r, 128);
    }

    #[test]
    fn test_saturate_edge_requires_odd() {
        assert!(SaturateEdgeFilter::new(Kernel::new(2, 2, vec![0.25; 4]).unwrap()).is_err());
        let mut f = SaturateEdgeFilter::default();
        assert!(f.set_param_text("Kernel", "1 1; 1 1").is_err());
        // Even kernels are accepted with integer-division centering.
        let even = ConvolutionFilter::new(Kernel::new(2, 2, vec![0.25; 4]).unwrap());
        assert!(even.process(&pattern(4, 4)).is_ok());
    }

    #[test]
    fn test_preset_param() {
        let mut f = ConvolutionFilter::default();
        f.set_param_text("Preset", "Sharpen").unwrap();
        assert_eq!(f.kernel(), &Kernel::sharpen());
        f.set_param_text("kernel", "1").unwrap();
        assert_eq!(f.kernel(), &Kernel::identity());
        assert!(f.set_param_text("Preset", "Wobble").is_err());
    }
}
