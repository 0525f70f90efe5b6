//! # pixfx-core
//!
//! Core types for the pixfx image filter library.
//!
//! - [`Color`], [`Argb8`] - Four-channel color in extended and byte form
//! - [`ImageAdapter`] - The pixel grid every filter reads and writes
//! - [`Rect`], [`ClipRegion`] - Regions for cropping and clipped filtering
//!
//! ## Crate Structure
//!
//! ```text
//! pixfx-core (this crate)
//!    ^
//!    |
//!    +-- pixfx-math (affine matrix, scalar helpers)
//!    +-- pixfx-ops (filters)
//!    +-- pixfx-io (PNG boundary)
//!    +-- pixfx-pipeline (XML pipelines)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialization for `Color`, `Argb8`, `Rect` and `PixelDepth`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod clip;
pub mod color;
pub mod error;
pub mod image;
pub mod rect;

pub use clip::*;
pub use color::*;
pub use error::*;
pub use image::*;
pub use rect::*;

/// Prelude module for convenient imports.
///
/// ```
/// use pixfx_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clip::ClipRegion;
    pub use crate::color::{Argb8, Channel, Color};
    pub use crate::error::{Error, Result};
    pub use crate::image::{ImageAdapter, PixelDepth};
    pub use crate::rect::Rect;
}
