//! Morphological operations with a square structuring element.
//!
//! # Operations
//!
//! - **Dilate** - channel-wise maximum over the window
//! - **Erode** - channel-wise minimum over the window
//! - **Open** - erode, then dilate (removes small bright details)
//! - **Close** - dilate, then erode (fills small dark holes)
//! - **Gradient** - dilate minus erode (outlines)
//!
//! Windows are `(2 * radius + 1)` wide and clamp to the image edges.
//! Alpha is processed like the color channels, except for `Gradient`, which
//! keeps the source alpha.

use std::fmt;
use std::str::FromStr;

use pixfx_core::{Color, ImageAdapter};
use pixfx_math::clamp_index;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::parallel::build_rows;
use crate::{Filter, OpsError, OpsResult};

/// Morphological operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum MorphOp {
    #[default]
    Dilate,
    Erode,
    Open,
    Close,
    Gradient,
}

impl FromStr for MorphOp {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dilate" => Ok(Self::Dilate),
            "erode" => Ok(Self::Erode),
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            "gradient" => Ok(Self::Gradient),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown morphology operation '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for MorphOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dilate => "Dilate",
            Self::Erode => "Erode",
            Self::Open => "Open",
            Self::Close => "Close",
            Self::Gradient => "Gradient",
        })
    }
}

fn channel_max(a: Color, b: Color) -> Color {
    Color::new(a.a.max(b.a), a.r.max(b.r), a.g.max(b.g), a.b.max(b.b))
}

fn channel_min(a: Color, b: Color) -> Color {
    Color::new(a.a.min(b.a), a.r.min(b.r), a.g.min(b.g), a.b.min(b.b))
}

fn morph(src: &ImageAdapter, radius: usize, pick: fn(Color, Color) -> Color) -> ImageAdapter {
    let (w, h) = src.dimensions();
    if radius == 0 || src.is_empty() {
        return src.clone();
    }
    let r = radius as isize;
    let pixels = build_rows(w, h, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc: Option<Color> = None;
            for dy in -r..=r {
                let sy = clamp_index(y as isize + dy, h);
                for dx in -r..=r {
                    let sx = clamp_index(x as isize + dx, w);
                    let c = src.pixel(sx, sy);
                    if c.is_empty() {
                        continue;
                    }
                    acc = Some(match acc {
                        Some(a) => pick(a, c),
                        None => c,
                    });
                }
            }
            *out = acc.unwrap_or(Color::EMPTY);
        }
    });
    ImageAdapter::from_colors_with_depth(w, h, pixels, src.depth())
        .unwrap_or_else(|_| src.clone())
}

/// Channel-wise maximum filter.
pub fn dilate(src: &ImageAdapter, radius: usize) -> ImageAdapter {
    trace!(width = src.width(), height = src.height(), radius, "dilate");
    morph(src, radius, channel_max)
}

/// Channel-wise minimum filter.
pub fn erode(src: &ImageAdapter, radius: usize) -> ImageAdapter {
    trace!(width = src.width(), height = src.height(), radius, "erode");
    morph(src, radius, channel_min)
}

/// Applies a morphological operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphologyFilter {
    /// Operation.
    pub operation: MorphOp,
    /// Window radius in pixels.
    pub radius: usize,
}

impl Default for MorphologyFilter {
    fn default() -> Self {
        Self {
            operation: MorphOp::Dilate,
            radius: 1,
        }
    }
}

impl MorphologyFilter {
    /// Creates the filter.
    pub fn new(operation: MorphOp, radius: usize) -> Self {
        Self { operation, radius }
    }
}

impl Filter for MorphologyFilter {
    fn name(&self) -> &'static str {
        "Morphology"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let r = self.radius;
        Ok(match self.operation {
            MorphOp::Dilate => dilate(source, r),
            MorphOp::Erode => erode(source, r),
            MorphOp::Open => dilate(&erode(source, r), r),
            MorphOp::Close => erode(&dilate(source, r), r),
            MorphOp::Gradient => {
                let hi = dilate(source, r);
                let lo = erode(source, r);
                let mut out = source.clone();
                for (i, px) in source.as_slice().iter().enumerate() {
                    if px.is_empty() {
                        continue;
                    }
                    let (x, y) = (i % source.width(), i / source.width());
                    let d = hi.pixel(x, y) - lo.pixel(x, y);
                    out.set(x, y, d.with_alpha(px.a));
                }
                out
            }
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Operation", "Dilate, Erode, Open, Close or Gradient", ParamValue::text(self.operation)),
            Param::new("Radius", "Window radius in pixels", ParamValue::Int(self.radius as i64)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Operation" => self.operation = value.into_enum(name)?,
            "Radius" => self.radius = value.into_usize(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(w: usize, h: usize, x: usize, y: usize) -> ImageAdapter {
        let mut img = ImageAdapter::filled(w, h, Color::BLACK);
        img.set(x, y, Color::WHITE);
        img
    }

    #[test]
    fn test_dilate_grows_dot() {
        let out = MorphologyFilter::new(MorphOp::Dilate, 1).process(&dot(5, 5, 2, 2)).unwrap();
        assert_eq!(out.pixel(1, 1), Color::WHITE);
        assert_eq!(out.pixel(3, 3), Color::WHITE);
        assert_eq!(out.pixel(0, 0), Color::BLACK);
    }

    #[test]
    fn test_erode_removes_dot() {
        let out = MorphologyFilter::new(MorphOp::Erode, 1).process(&dot(5, 5, 2, 2)).unwrap();
        assert!(out.pixels().all(|(_, _, c)| c == Color::BLACK));
    }

    #[test]
    fn test_open_removes_close_keeps() {
        let img = dot(7, 7, 3, 3);
        let opened = MorphologyFilter::new(MorphOp::Open, 1).process(&img).unwrap();
        assert_eq!(opened.pixel(3, 3), Color::BLACK);
        let closed = MorphologyFilter::new(MorphOp::Close, 1).process(&img).unwrap();
        assert_eq!(closed, img);
    }

    #[test]
    fn test_gradient_outlines() {
        let out = MorphologyFilter::new(MorphOp::Gradient, 1).process(&dot(5, 5, 2, 2)).unwrap();
        assert_eq!(out.pixel(2, 2).r, 1.0);
        assert_eq!(out.pixel(0, 0).r, 0.0);
        assert_eq!(out.pixel(0, 0).a, 1.0);
    }

    #[test]
    fn test_zero_radius_identity() {
        let img = dot(3, 3, 1, 1);
        assert_eq!(MorphologyFilter::new(MorphOp::Close, 0).process(&img).unwrap(), img);
    }
}
