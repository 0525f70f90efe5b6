//! Per-pixel color adjustments.
//!
//! - [`GrayscaleFilter`] - Rec.601 luminance
//! - [`GammaFilter`] - Power curve
//! - [`BrightnessContrastFilter`] - Offset and contrast about mid-gray, with auto mode
//! - [`TintFilter`] - Luminance-preserving tint
//! - [`TintShadeFilter`] - Full tint, then toward black or white
//!
//! Alpha is passed through by all of them; empty pixels stay empty.

use pixfx_core::{Color, ImageAdapter};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

fn check_range(name: &str, value: f64, lo: f64, hi: f64) -> OpsResult<f64> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(OpsError::InvalidParameter(format!(
            "{} must be in [{}, {}], got {}",
            name, lo, hi, value
        )));
    }
    Ok(value)
}

/// Replaces red, green and blue with the Rec.601 luminance.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrayscaleFilter;

impl Filter for GrayscaleFilter {
    fn name(&self) -> &'static str {
        "Grayscale"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        Ok(source.map(|c| {
            if c.is_empty() {
                return c;
            }
            let l = c.luminance();
            Color::new(c.a, l, l, l)
        }))
    }
}

/// Raises each color channel to `gamma`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaFilter {
    gamma: f64,
}

impl Default for GammaFilter {
    fn default() -> Self {
        Self { gamma: 1.0 }
    }
}

impl GammaFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a negative gamma.
    pub fn new(gamma: f64) -> OpsResult<Self> {
        let mut f = Self::default();
        f.set_gamma(gamma)?;
        Ok(f)
    }

    /// Sets gamma (must be >= 0).
    pub fn set_gamma(&mut self, gamma: f64) -> OpsResult<()> {
        self.gamma = check_range("Gamma", gamma, 0.0, f64::MAX)?;
        Ok(())
    }

    /// Current gamma.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Filter for GammaFilter {
    fn name(&self) -> &'static str {
        "Gamma"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let g = self.gamma;
        Ok(source.map(|c| c.map_rgb(|v| v.max(0.0).powf(g))))
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("Gamma", "Exponent applied to each color channel", ParamValue::Double(self.gamma))]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Gamma" => self.set_gamma(value.into_double(name)?),
            _ => Err(OpsError::unknown_parameter(self.name(), name)),
        }
    }
}

/// `c' = (c + brightness - 0.5) * (1 + contrast) + 0.5` per color channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrightnessContrastFilter {
    brightness: f64,
    contrast: f64,
    /// Derive brightness and contrast from the image instead.
    pub auto_adjust: bool,
}

impl BrightnessContrastFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if either value is outside `[-1, 1]`.
    pub fn new(brightness: f64, contrast: f64) -> OpsResult<Self> {
        let mut f = Self::default();
        f.set_brightness(brightness)?;
        f.set_contrast(contrast)?;
        Ok(f)
    }

    /// Automatic mode.
    pub fn auto() -> Self {
        Self {
            auto_adjust: true,
            ..Self::default()
        }
    }

    /// Sets brightness in `[-1, 1]`.
    pub fn set_brightness(&mut self, brightness: f64) -> OpsResult<()> {
        self.brightness = check_range("Brightness", brightness, -1.0, 1.0)?;
        Ok(())
    }

    /// Sets contrast in `[-1, 1]`.
    pub fn set_contrast(&mut self, contrast: f64) -> OpsResult<()> {
        self.contrast = check_range("Contrast", contrast, -1.0, 1.0)?;
        Ok(())
    }

    /// Brightness and contrast that center the mean luminance and stretch
    /// its range. Returns `(0, 0)` for an image without assigned pixels.
    pub fn auto_values(image: &ImageAdapter) -> (f64, f64) {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for c in image.as_slice().iter().filter(|c| !c.is_empty()) {
            let l = c.luminance();
            sum += l;
            count += 1;
            min = min.min(l);
            max = max.max(l);
        }
        if count == 0 {
            return (0.0, 0.0);
        }
        let brightness = (0.5 - sum / count as f64).clamp(-1.0, 1.0);
        let range = max - min;
        let contrast = if range <= 0.0 {
            0.0
        } else {
            (1.0 / range - 1.0).clamp(-1.0, 1.0)
        };
        (brightness, contrast)
    }
}

impl Filter for BrightnessContrastFilter {
    fn name(&self) -> &'static str {
        "BrightnessContrast"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let (b, k) = if self.auto_adjust {
            let values = Self::auto_values(source);
            debug!(brightness = values.0, contrast = values.1, "auto brightness/contrast");
            values
        } else {
            (self.brightness, self.contrast)
        };
        Ok(source.map(|c| c.map_rgb(|v| (v + b - 0.5) * (1.0 + k) + 0.5)))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Brightness", "Offset in [-1, 1]", ParamValue::Double(self.brightness)),
            Param::new("Contrast", "Contrast in [-1, 1]", ParamValue::Double(self.contrast)),
            Param::new("AutoAdjust", "Derive both values from the image", ParamValue::Bool(self.auto_adjust)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Brightness" => self.set_brightness(value.into_double(name)?),
            "Contrast" => self.set_contrast(value.into_double(name)?),
            "AutoAdjust" => {
                self.auto_adjust = value.into_bool(name)?;
                Ok(())
            }
            _ => Err(OpsError::unknown_parameter(self.name(), name)),
        }
    }
}

/// Luminance-preserving tint of `c` at full strength.
fn tinted(c: Color, tint: Color) -> Color {
    let scale = c.luminance() / tint.luminance().max(1e-6);
    Color::new(c.a, tint.r * scale, tint.g * scale, tint.b * scale)
}

/// Blends toward a tint of the same luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintFilter {
    /// Tint color; its alpha is ignored.
    pub tint: Color,
    amount: f64,
}

impl Default for TintFilter {
    fn default() -> Self {
        Self {
            tint: Color::WHITE,
            amount: 1.0,
        }
    }
}

impl TintFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `amount` is outside `[0, 1]`.
    pub fn new(tint: Color, amount: f64) -> OpsResult<Self> {
        let mut f = Self {
            tint,
            ..Self::default()
        };
        f.set_amount(amount)?;
        Ok(f)
    }

    /// Sets the blend amount in `[0, 1]`.
    pub fn set_amount(&mut self, amount: f64) -> OpsResult<()> {
        self.amount = check_range("Amount", amount, 0.0, 1.0)?;
        Ok(())
    }
}

impl Filter for TintFilter {
    fn name(&self) -> &'static str {
        "Tint"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let tint = self.tint.or_transparent();
        let amount = self.amount;
        Ok(source.map(|c| {
            if c.is_empty() {
                return c;
            }
            c.lerp(tinted(c, tint), amount).with_alpha(c.a)
        }))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Tint", "Tint color", ParamValue::Color(self.tint)),
            Param::new("Amount", "Blend amount in [0, 1]", ParamValue::Double(self.amount)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Tint" => {
                self.tint = value.into_color(name)?;
                Ok(())
            }
            "Amount" => self.set_amount(value.into_double(name)?),
            _ => Err(OpsError::unknown_parameter(self.name(), name)),
        }
    }
}

/// Full tint followed by a shade: positive values darken, negative lighten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintShadeFilter {
    /// Tint color; its alpha is ignored.
    pub tint: Color,
    shade: f64,
}

impl Default for TintShadeFilter {
    fn default() -> Self {
        Self {
            tint: Color::WHITE,
            shade: 0.0,
        }
    }
}

impl TintShadeFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `shade` is outside `[-1, 1]`.
    pub fn new(tint: Color, shade: f64) -> OpsResult<Self> {
        let mut f = Self {
            tint,
            ..Self::default()
        };
        f.set_shade(shade)?;
        Ok(f)
    }

    /// Sets the shade in `[-1, 1]`.
    pub fn set_shade(&mut self, shade: f64) -> OpsResult<()> {
        self.shade = check_range("Shade", shade, -1.0, 1.0)?;
        Ok(())
    }
}

impl Filter for TintShadeFilter {
    fn name(&self) -> &'static str {
        "TintShade"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let tint = self.tint.or_transparent();
        let shade = self.shade;
        let target = if shade >= 0.0 { Color::BLACK } else { Color::WHITE };
        Ok(source.map(|c| {
            if c.is_empty() {
                return c;
            }
            tinted(c, tint).lerp(target, shade.abs()).with_alpha(c.a)
        }))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Tint", "Tint color", ParamValue::Color(self.tint)),
            Param::new("Shade", "Shade in [-1, 1]: positive darkens, negative lightens", ParamValue::Double(self.shade)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Tint" => {
                self.tint = value.into_color(name)?;
                Ok(())
            }
            "Shade" => self.set_shade(value.into_double(name)?),
            _ => Err(OpsError::unknown_parameter(self.name(), name)),
        }
    }
}
