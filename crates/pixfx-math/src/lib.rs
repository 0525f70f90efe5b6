//! # pixfx-math
//!
//! Math utilities for the pixfx filter library.
//!
//! - [`Matrix2x3`] - 2D affine transform driving the spatial filters
//! - Scalar helpers: [`lerp`], [`snap`], [`keys_cubic`]
//! - Edge index policies: [`fold_index`], [`reflect_index`], [`clamp_index`]
//!
//! # Dependencies
//!
//! - [`glam`] - `DAffine2` backs the matrix type
//! - `pixfx-core` - Error type for parsing
//!
//! # Used By
//!
//! - `pixfx-ops` - Samplers, affine engine, convolution edges

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod interp;
mod matrix;

pub use interp::*;
pub use matrix::*;

/// Re-export glam types for direct use
pub mod glam {
    pub use ::glam::{DAffine2, DMat2, DVec2};
}
