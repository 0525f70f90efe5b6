//! Glow: a blurred, scaled copy of the image screen-blended over it.

use pixfx_core::{Color, ImageAdapter};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::gaussian::{blur_kernel_shape, check_radius, separable_gaussian};
use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

/// Screen blend of one channel; both inputs are clamped to `[0, 1]`.
#[inline]
pub fn screen(a: f64, b: f64) -> f64 {
    let (a, b) = (a.clamp(0.0, 1.0), b.clamp(0.0, 1.0));
    1.0 - (1.0 - a) * (1.0 - b)
}

/// Adds a soft halo around bright areas.
///
/// With `color` set, the halo takes that color scaled by the blurred
/// luminance; otherwise it keeps the blurred colors. Source alpha is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowFilter {
    radius: f64,
    intensity: f64,
    /// Optional halo color.
    pub color: Option<Color>,
}

impl Default for GlowFilter {
    fn default() -> Self {
        Self {
            radius: 4.0,
            intensity: 1.0,
            color: None,
        }
    }
}

impl GlowFilter {
    /// Creates the filter.
    pub fn new(radius: f64, intensity: f64) -> OpsResult<Self> {
        let mut f = Self::default();
        f.set_radius(radius)?;
        f.set_intensity(intensity)?;
        Ok(f)
    }

    /// Builder for the halo color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the blur radius.
    pub fn set_radius(&mut self, radius: f64) -> OpsResult<()> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    /// Sets the halo intensity.
    pub fn set_intensity(&mut self, intensity: f64) -> OpsResult<()> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "intensity must be >= 0, got {}",
                intensity
            )));
        }
        self.intensity = intensity;
        Ok(())
    }

    /// Blur radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Halo intensity.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl Filter for GlowFilter {
    fn name(&self) -> &'static str {
        "Glow"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let (half_length, sigma) = blur_kernel_shape(self.radius);
        debug!(radius = self.radius, half_length, intensity = self.intensity, "glow");
        let blurred = separable_gaussian(source, half_length, sigma);
        let k = self.intensity;
        let tint = self.color.map(|c| c.or_transparent());

        let mut out = source.clone();
        for (i, px) in source.as_slice().iter().enumerate() {
            if px.is_empty() {
                continue;
            }
            let (x, y) = (i % source.width(), i / source.width());
            let b = blurred.pixel(x, y).or_transparent();
            let halo = match tint {
                Some(t) => {
                    let l = b.luminance() * k;
                    (t.r * l, t.g * l, t.b * l)
                }
                None => (b.r * k, b.g * k, b.b * k),
            };
            out.set(
                x,
                y,
                Color::new(px.a, screen(px.r, halo.0), screen(px.g, halo.1), screen(px.b, halo.2)),
            );
        }
        Ok(out)
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Radius", "Halo blur radius in pixels", ParamValue::Double(self.radius)),
            Param::new("Intensity", "Halo strength", ParamValue::Double(self.intensity)),
            Param::new(
                "Color",
                "Halo color; empty keeps the image colors",
                ParamValue::Color(self.color.unwrap_or(Color::EMPTY)),
            ),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Radius" => self.set_radius(value.into_double(name)?)?,
            "Intensity" => self.set_intensity(value.into_double(name)?)?,
            "Color" => {
                let c = value.into_color(name)?;
                self.color = if c.is_empty() { None } else { Some(c) };
            }
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}
