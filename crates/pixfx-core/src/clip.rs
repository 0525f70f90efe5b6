//! Clipping regions restricting where a filter's output is kept.
//!
//! A [`ClipRegion`] is either a union of rectangles or a per-pixel boolean
//! mask. Pixels outside the region keep their original value; see
//! [`ClipRegion::merge`].

use crate::{Error, ImageAdapter, Rect, Result};

/// Region of an image a filter is allowed to modify.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipRegion {
    /// Union of rectangles. Parts outside the image are ignored.
    Rects(Vec<Rect>),
    /// Row-major boolean mask; `true` means the pixel is covered.
    Mask {
        /// Mask width
        width: usize,
        /// Mask height
        height: usize,
        /// One entry per pixel
        bits: Vec<bool>,
    },
}

impl ClipRegion {
    /// Region made of a single rectangle.
    pub fn rect(rect: Rect) -> Self {
        Self::Rects(vec![rect])
    }

    /// Builds a mask region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] when `bits.len() != width * height`.
    pub fn mask(width: usize, height: usize, bits: Vec<bool>) -> Result<Self> {
        if bits.len() != width * height {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("mask has {} entries", bits.len()),
            ));
        }
        Ok(Self::Mask {
            width,
            height,
            bits,
        })
    }

    /// Builds a mask from an image: opaque-enough, non-empty pixels are covered.
    pub fn mask_from_image(image: &ImageAdapter) -> Self {
        Self::Mask {
            width: image.width(),
            height: image.height(),
            bits: image
                .as_slice()
                .iter()
                .map(|c| !c.is_empty() && c.a > 0.0)
                .collect(),
        }
    }

    /// Returns `true` if the pixel at (x, y) is inside the region.
    pub fn covers(&self, x: usize, y: usize) -> bool {
        match self {
            Self::Rects(rects) => rects.iter().any(|r| r.contains(x, y)),
            Self::Mask {
                width,
                height,
                bits,
            } => x < *width && y < *height && bits[y * width + x],
        }
    }

    /// Checks the region can be applied to a `width x height` image.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        match self {
            Self::Rects(_) => Ok(()),
            Self::Mask {
                width: mw,
                height: mh,
                ..
            } => {
                if (*mw, *mh) != (width, height) {
                    Err(Error::dimension_mismatch((*mw, *mh), (width, height)))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Combines `filtered` and `original`: covered pixels come from
    /// `filtered`, everything else from `original`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the images differ in size, or
    /// if a mask region does not match them.
    pub fn merge(&self, original: &ImageAdapter, filtered: &ImageAdapter) -> Result<ImageAdapter> {
        if !original.same_size(filtered) {
            return Err(Error::dimension_mismatch(
                original.dimensions(),
                filtered.dimensions(),
            ));
        }
        self.validate(original.width(), original.height())?;

        let mut out = filtered.clone();
        for y in 0..original.height() {
            for x in 0..original.width() {
                if !self.covers(x, y) {
                    out.set(x, y, original.pixel(x, y));
                }
            }
        }
        Ok(out)
    }
}

impl From<Rect> for ClipRegion {
    fn from(rect: Rect) -> Self {
        Self::rect(rect)
    }
}

impl From<Vec<Rect>> for ClipRegion {
    fn from(rects: Vec<Rect>) -> Self {
        Self::Rects(rects)
    }
}
