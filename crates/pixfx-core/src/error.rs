//! Error types for pixfx-core operations.
//!
//! The [`Error`] enum covers the failure modes of the data model itself:
//! - Pixel addressing (bounds checking)
//! - Buffer construction from raw data
//! - Clipping region validation
//!
//! Filter-level failures (bad parameters, singular matrices) live in
//! `pixfx-ops` and wrap this type.
//!
//! # Usage
//!
//! ```rust
//! use pixfx_core::{Error, Result};
//!
//! fn check(x: usize, y: usize, width: usize, height: usize) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//! assert!(check(3, 0, 2, 2).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the pixel/image data model.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside image bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: usize,
        /// Y coordinate that was out of bounds
        y: usize,
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },

    /// Region extends beyond image bounds.
    #[error("region ({rx}, {ry}, {rw}x{rh}) exceeds image bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: usize,
        /// Region Y origin
        ry: usize,
        /// Region width
        rw: usize,
        /// Region height
        rh: usize,
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },

    /// Image dimensions don't match for the operation.
    ///
    /// Returned when an operation requires images (or masks) of the same size.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First image width
        a_width: usize,
        /// First image height
        a_height: usize,
        /// Second image width
        b_width: usize,
        /// Second image height
        b_height: usize,
    },

    /// Invalid image dimensions or buffer length.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(
        rx: usize,
        ry: usize,
        rw: usize,
        rh: usize,
        width: usize,
        height: usize,
    ) -> Self {
        Self::InvalidRegion {
            rx,
            ry,
            rw,
            rh,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: usize, height: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds(100, 50, 80, 60);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("80x60"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((100, 100), (200, 50));
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("200x50"));
        assert!(!err.is_bounds_error());
    }
}
