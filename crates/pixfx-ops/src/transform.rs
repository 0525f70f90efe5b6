//! Exact orthogonal transforms: flips and crops.
//!
//! These move pixels without resampling, unlike [`crate::spatial`].
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter, Rect};
//! use pixfx_ops::transform::{crop, flip_h};
//!
//! let mut img = ImageAdapter::filled(4, 4, Color::BLACK);
//! img.set(0, 0, Color::WHITE);
//!
//! let flipped = flip_h(&img);
//! assert_eq!(flipped.pixel(3, 0), Color::WHITE);
//!
//! let cropped = crop(&img, Rect::new(0, 0, 2, 2)).unwrap();
//! assert_eq!(cropped.dimensions(), (2, 2));
//! ```

use std::fmt;
use std::str::FromStr;

use pixfx_core::{ImageAdapter, Rect};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

/// Crops a region from the image.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] for an empty region or one that
/// exceeds the image.
pub fn crop(src: &ImageAdapter, rect: Rect) -> OpsResult<ImageAdapter> {
    if rect.is_empty() || !rect.fits_within(src.width(), src.height()) {
        return Err(OpsError::InvalidDimensions(format!(
            "crop region {}x{} at ({},{}) exceeds {}x{}",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            src.width(),
            src.height()
        )));
    }
    Ok(src.crop(rect)?)
}

/// Flips image horizontally (left-right mirror).
pub fn flip_h(src: &ImageAdapter) -> ImageAdapter {
    let w = src.width();
    src.map_indexed(|x, y, _| src.pixel(w - 1 - x, y))
}

/// Flips image vertically (top-bottom mirror).
pub fn flip_v(src: &ImageAdapter) -> ImageAdapter {
    let h = src.height();
    src.map_indexed(|x, y, _| src.pixel(x, h - 1 - y))
}

/// Flip axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipDirection {
    /// Mirror left-right.
    #[default]
    Horizontal,
    /// Mirror top-bottom.
    Vertical,
    /// Both axes (same as a 180 degree turn).
    Both,
}

impl FromStr for FlipDirection {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Self::Horizontal),
            "vertical" | "v" => Ok(Self::Vertical),
            "both" => Ok(Self::Both),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown flip direction '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
            Self::Both => "Both",
        })
    }
}

/// Mirrors the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipFilter {
    /// Axis to mirror.
    pub direction: FlipDirection,
}

impl FlipFilter {
    /// Flip along `direction`.
    pub fn new(direction: FlipDirection) -> Self {
        Self { direction }
    }
}

impl Filter for FlipFilter {
    fn name(&self) -> &'static str {
        "Flip"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        Ok(match self.direction {
            FlipDirection::Horizontal => flip_h(source),
            FlipDirection::Vertical => flip_v(source),
            FlipDirection::Both => flip_v(&flip_h(source)),
        })
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new(
            "Direction",
            "Horizontal, Vertical or Both",
            ParamValue::text(self.direction),
        )]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Direction" => self.direction = value.into_enum(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

/// Keeps a rectangle of the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropFilter {
    /// Region to keep. An empty rectangle keeps the whole image.
    pub rect: Rect,
}

impl CropFilter {
    /// Crop to `rect`.
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Filter for CropFilter {
    fn name(&self) -> &'static str {
        "Crop"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        if self.rect.is_empty() {
            return Ok(source.clone());
        }
        crop(source, self.rect)
    }

    fn params(&self) -> Vec<Param> {
        let int = |v: usize| ParamValue::Int(v as i64);
        vec![
            Param::new("X", "Left edge", int(self.rect.x)),
            Param::new("Y", "Top edge", int(self.rect.y)),
            Param::new("Width", "Width (0 keeps the whole image)", int(self.rect.width)),
            Param::new("Height", "Height (0 keeps the whole image)", int(self.rect.height)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "X" => self.rect.x = value.into_usize(name)?,
            "Y" => self.rect.y = value.into_usize(name)?,
            "Width" => self.rect.width = value.into_usize(name)?,
            "Height" => self.rect.height = value.into_usize(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::Color;

    fn numbered(w: usize, h: usize) -> ImageAdapter {
        ImageAdapter::new(w, h).map_indexed(|x, y, _| Color::from_argb8(255, x as u8, y as u8, 0))
    }

    #[test]
    fn test_flip_h() {
        let img = numbered(3, 2);
        let out = FlipFilter::new(FlipDirection::Horizontal).process(&img).unwrap();
        assert_eq!(out.pixel(0, 1), img.pixel(2, 1));
    }

    #[test]
    fn test_flip_both_twice_is_identity() {
        let img = numbered(4, 3);
        let f = FlipFilter::new(FlipDirection::Both);
        let out = f.process(&f.process(&img).unwrap()).unwrap();
        assert_eq!(out, img);
        assert_eq!(f.process(&img).unwrap().pixel(0, 0), img.pixel(3, 2));
    }

    #[test]
    fn test_crop_bounds() {
        let img = numbered(4, 4);
        let out = CropFilter::new(Rect::new(1, 1, 2, 3)).process(&img).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.pixel(0, 0), img.pixel(1, 1));
        assert!(CropFilter::new(Rect::new(3, 3, 2, 2)).process(&img).is_err());
    }

    #[test]
    fn test_crop_params() {
        let mut f = CropFilter::default();
        f.set_param_text("Width", "2").unwrap();
        f.set_param_text("Height", "2").unwrap();
        assert_eq!(f.rect, Rect::new(0, 0, 2, 2));
        assert!(f.set_param_text("Width", "-2").is_err());
    }
}
