//! Pixel rectangles used for cropping and clipping regions.
//!
//! All coordinates use the standard image convention:
//! - Origin (0, 0) is at the **top-left** corner
//! - X increases to the right
//! - Y increases downward
//!
//! # Usage
//!
//! ```rust
//! use pixfx_core::Rect;
//!
//! let rect = Rect::new(10, 20, 100, 50);
//! assert!(rect.contains(15, 25));
//! assert!(!rect.contains(5, 25));
//!
//! let other = Rect::new(50, 40, 100, 50);
//! let overlap = rect.intersect(&other).unwrap();
//! assert_eq!((overlap.width, overlap.height), (60, 30));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// A rectangle with zero width or height is empty and contains no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge X coordinate.
    pub x: usize,
    /// Top edge Y coordinate.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Creates a new rectangle.
    #[inline]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin.
    #[inline]
    pub const fn from_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the exclusive right edge.
    #[inline]
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// Returns the exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Returns the area in pixels.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point lies inside the rectangle.
    #[inline]
    pub const fn contains(&self, px: usize, py: usize) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns the overlapping area, or `None` if the rectangles are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Returns the smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Clips the rectangle to `width x height` image bounds.
    pub fn clamp_to(&self, width: usize, height: usize) -> Option<Rect> {
        self.intersect(&Rect::from_size(width, height))
    }

    /// Returns `true` if the rectangle lies fully inside a `width x height` image.
    #[inline]
    pub const fn fits_within(&self, width: usize, height: usize) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Iterates over every pixel coordinate, row by row.
    pub fn iter_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| (x, y)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,width,height`.
impl FromStr for Rect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Error::other(format!(
                "rectangle '{}' must be x,y,width,height",
                s
            )));
        }
        let mut values = [0usize; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| Error::other(format!("invalid rectangle component '{}'", part)))?;
        }
        Ok(Rect::new(values[0], values[1], values[2], values[3]))
    }
}
