//! Filter construction by name.
//!
//! Pipelines and the command line name filters by the string returned from
//! [`Filter::name`]. Lookup ignores ASCII case.
//!
//! ```rust
//! use pixfx_ops::registry;
//!
//! let blur = registry::create("blur").unwrap();
//! assert_eq!(blur.name(), "Blur");
//! assert!(registry::create("Sepia").is_err());
//! ```

use crate::adjust::{BrightnessContrastFilter, GammaFilter, GrayscaleFilter, TintFilter, TintShadeFilter};
use crate::channels::{ChannelJoinFilter, ChannelSplitFilter};
use crate::color_space::ColorSpaceFilter;
use crate::convolution::{ConvolutionFilter, SaturateEdgeFilter};
use crate::gaussian::{BlurFilter, GaussianFilter};
use crate::glow::GlowFilter;
use crate::histogram::{HistogramEqualizeFilter, HistogramStretchFilter};
use crate::logical::LogicalOperationFilter;
use crate::morphology::MorphologyFilter;
use crate::pixelize::PixelizeFilter;
use crate::resize::ResizeFilter;
use crate::spatial::SpatialTransformFilter;
use crate::transform::{CropFilter, FlipFilter};
use crate::wavelet::WaveletFilter;
use crate::{Filter, IdentityFilter, OpsError, OpsResult};

type Constructor = fn() -> Box<dyn Filter>;

fn boxed<F: Filter + Default + 'static>() -> Box<dyn Filter> {
    Box::new(F::default())
}

const FILTERS: &[(&str, Constructor)] = &[
    ("Identity", boxed::<IdentityFilter>),
    ("SpatialTransform", boxed::<SpatialTransformFilter>),
    ("Resize", boxed::<ResizeFilter>),
    ("Flip", boxed::<FlipFilter>),
    ("Crop", boxed::<CropFilter>),
    ("Convolution", boxed::<ConvolutionFilter>),
    ("SaturateEdge", boxed::<SaturateEdgeFilter>),
    ("Gaussian", boxed::<GaussianFilter>),
    ("Blur", boxed::<BlurFilter>),
    ("HistogramStretch", boxed::<HistogramStretchFilter>),
    ("HistogramEqualize", boxed::<HistogramEqualizeFilter>),
    ("Grayscale", boxed::<GrayscaleFilter>),
    ("Gamma", boxed::<GammaFilter>),
    ("BrightnessContrast", boxed::<BrightnessContrastFilter>),
    ("Tint", boxed::<TintFilter>),
    ("TintShade", boxed::<TintShadeFilter>),
    ("Morphology", boxed::<MorphologyFilter>),
    ("LogicalOperation", boxed::<LogicalOperationFilter>),
    ("Glow", boxed::<GlowFilter>),
    ("Pixelize", boxed::<PixelizeFilter>),
    ("ChannelSplit", boxed::<ChannelSplitFilter>),
    ("ChannelJoin", boxed::<ChannelJoinFilter>),
    ("ColorSpace", boxed::<ColorSpaceFilter>),
    ("Wavelet", boxed::<WaveletFilter>),
];

/// Creates a filter with default parameters.
///
/// # Errors
///
/// Returns [`OpsError::UnknownFilter`] if no filter has that name.
pub fn create(name: &str) -> OpsResult<Box<dyn Filter>> {
    let key = name.trim();
    FILTERS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(key))
        .map(|(_, make)| make())
        .ok_or_else(|| OpsError::UnknownFilter(name.to_string()))
}

/// Names of every registered filter.
pub fn names() -> impl Iterator<Item = &'static str> {
    FILTERS.iter().map(|(n, _)| *n)
}
