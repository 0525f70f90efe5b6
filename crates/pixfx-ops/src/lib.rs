//! # pixfx-ops
//!
//! Composable image filters built on [`pixfx_core::ImageAdapter`].
//!
//! Every filter is a value implementing [`Filter`]: configure it, call
//! [`Filter::process`], get a new image. Filters chain with [`FilterChain`]
//! and can be created by name through [`registry`].
//!
//! # Modules
//!
//! - [`filter`] - The contract, identity and chaining
//! - [`param`] - Dynamic name / value parameter view
//! - [`interpolate`] - Nearest, bilinear and bicubic sampling
//! - [`spatial`] - Affine transform engine and `SpatialTransform`
//! - [`resize`], [`transform`] - Resampling, flip and crop
//! - [`convolution`], [`gaussian`] - Kernels, blur and Gaussian
//! - [`histogram`] - Stretch and equalize
//! - [`adjust`], [`color_space`], [`channels`], [`logical`] - Per-pixel filters
//! - [`morphology`], [`glow`], [`pixelize`], [`wavelet`] - Neighborhood filters
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{BlurFilter, Filter, FilterChain, GrayscaleFilter};
//!
//! let img = ImageAdapter::filled(16, 16, Color::rgb(0.8, 0.2, 0.1));
//! let chain = FilterChain::new()
//!     .with(GrayscaleFilter)
//!     .with(BlurFilter::new(1.5)?);
//! let out = chain.process(&img)?;
//! assert_eq!(out.dimensions(), (16, 16));
//! # Ok::<(), pixfx_ops::OpsError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Row loops run on rayon
//! - `serde` - `Serialize` for [`ParamDescriptor`] and [`ParamKind`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod parallel;

pub mod adjust;
pub mod channels;
pub mod color_space;
pub mod convolution;
pub mod filter;
pub mod gaussian;
pub mod glow;
pub mod histogram;
pub mod interpolate;
pub mod kernel;
pub mod logical;
pub mod morphology;
pub mod param;
pub mod pixelize;
pub mod registry;
pub mod resize;
pub mod spatial;
pub mod transform;
pub mod wavelet;

pub use error::{OpsError, OpsResult};
pub use filter::{Filter, FilterChain, IdentityFilter};
pub use kernel::{Kernel, KernelPreset};
pub use param::{Param, ParamDescriptor, ParamKind, ParamValue};

pub use adjust::{BrightnessContrastFilter, GammaFilter, GrayscaleFilter, TintFilter, TintShadeFilter};
pub use channels::{ChannelJoinFilter, ChannelSplitFilter};
pub use color_space::{ColorConversion, ColorSpaceFilter};
pub use convolution::{ConvolutionFilter, ConvolveOptions, EdgeMode, SaturateEdgeFilter};
pub use gaussian::{BlurFilter, GaussianFilter, MAX_HALF_LENGTH, gaussian_weights};
pub use glow::GlowFilter;
pub use histogram::{Histogram, HistogramEqualizeFilter, HistogramStretchFilter};
pub use interpolate::Interpolation;
pub use logical::{LogicalOp, LogicalOperationFilter};
pub use morphology::{MorphOp, MorphologyFilter};
pub use pixelize::PixelizeFilter;
pub use resize::{ResampleFilter, ResizeFilter};
pub use spatial::{AffineTransform, SpatialTransformFilter, TransformOp, fold_ops, prescale_factors};
pub use transform::{CropFilter, FlipDirection, FlipFilter};
pub use wavelet::{WaveletDirection, WaveletFilter};
