//! The filter contract shared by every operation in this crate.
//!
//! A [`Filter`] is a value holding its own configuration. Callers set
//! parameters (typed methods on the concrete type, or the dynamic
//! [`Filter::set_param`] view), then call [`Filter::process`] to get a new
//! image. [`Filter::process_clipped`] restricts the change to a
//! [`ClipRegion`].
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{ClipRegion, Color, ImageAdapter, Rect};
//! use pixfx_ops::{Filter, GrayscaleFilter};
//!
//! let img = ImageAdapter::filled(4, 4, Color::rgb(1.0, 0.0, 0.0));
//! let gray = GrayscaleFilter.process(&img).unwrap();
//! assert_eq!(gray.pixel(0, 0).to_argb8().g, 76);
//!
//! // Only the top-left pixel is changed.
//! let clipped = GrayscaleFilter
//!     .process_clipped(&img, &ClipRegion::rect(Rect::new(0, 0, 1, 1)))
//!     .unwrap();
//! assert_eq!(clipped.pixel(1, 1), img.pixel(1, 1));
//! ```

use pixfx_core::{ClipRegion, ImageAdapter};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue, find_param};
use crate::{OpsError, OpsResult};

/// An image-to-image operation with named parameters.
pub trait Filter: Send + Sync {
    /// Name used by the registry and pipelines.
    fn name(&self) -> &'static str;

    /// Computes the filtered image. `source` is never zero-area when called
    /// through [`Filter::process`].
    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter>;

    /// Describes the parameters with their current values.
    fn params(&self) -> Vec<Param> {
        Vec::new()
    }

    /// Assigns a parameter by its exact name.
    ///
    /// # Errors
    ///
    /// [`OpsError::UnknownParameter`] for a name the filter does not have,
    /// [`OpsError::ParameterType`] for a value of the wrong kind and
    /// [`OpsError::InvalidParameter`] for an out-of-range value.
    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        let _ = value;
        Err(OpsError::unknown_parameter(self.name(), name))
    }

    /// Parses `text` as the parameter's kind and assigns it. The name
    /// lookup ignores ASCII case.
    fn set_param_text(&mut self, name: &str, text: &str) -> OpsResult<()> {
        let params = self.params();
        let param = find_param(&params, name)
            .ok_or_else(|| OpsError::unknown_parameter(self.name(), name))?;
        let value = ParamValue::parse(param.kind(), text)?;
        let canonical = param.name;
        self.set_param(canonical, value)
    }

    /// Validates the source and runs [`Filter::apply`].
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidDimensions`] for a zero-area source.
    fn process(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        if source.is_empty() {
            return Err(OpsError::InvalidDimensions(format!(
                "{}: source image {}x{} has zero area",
                self.name(),
                source.width(),
                source.height()
            )));
        }
        trace!(
            filter = self.name(),
            width = source.width(),
            height = source.height(),
            "process"
        );
        self.apply(source)
    }

    /// Runs [`Filter::process`] and keeps the original pixels outside `region`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::SizeMismatch`] if the filter changed the image
    /// dimensions, and a core dimension error if a mask region does not
    /// match the source.
    fn process_clipped(
        &self,
        source: &ImageAdapter,
        region: &ClipRegion,
    ) -> OpsResult<ImageAdapter> {
        region.validate(source.width(), source.height())?;
        let filtered = self.process(source)?;
        if !filtered.same_size(source) {
            return Err(OpsError::SizeMismatch(format!(
                "{} changed the image from {}x{} to {}x{}; clipping needs equal sizes",
                self.name(),
                source.width(),
                source.height(),
                filtered.width(),
                filtered.height()
            )));
        }
        Ok(region.merge(source, &filtered)?)
    }
}

/// Returns the source unchanged (as a deep copy).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl Filter for IdentityFilter {
    fn name(&self) -> &'static str {
        "Identity"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        Ok(source.clone())
    }
}

/// Runs filters one after another.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty chain (behaves as identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Builder form of [`FilterChain::push`].
    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for FilterChain {
    fn name(&self) -> &'static str {
        "Chain"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let mut current = source.clone();
        for filter in &self.filters {
            debug!(filter = filter.name(), "chain step");
            current = filter.process(&current)?;
        }
        Ok(current)
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.filters.iter().map(|flt| flt.name()).collect();
        f.debug_struct("FilterChain").field("filters", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::{Color, Rect};

    struct Shrink;

    impl Filter for Shrink {
        fn name(&self) -> &'static str {
            "Shrink"
        }

        fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
            Ok(ImageAdapter::new(source.width() / 2, source.height()))
        }
    }

    #[test]
    fn test_process_rejects_zero_area() {
        let err = IdentityFilter.process(&ImageAdapter::new(0, 5)).unwrap_err();
        assert!(matches!(err, OpsError::InvalidDimensions(_)));
    }

    #[test]
    fn test_identity_is_deep_copy() {
        let img = ImageAdapter::filled(2, 2, Color::WHITE);
        let out = IdentityFilter.process(&img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_clipping_restores_outside() {
        let img = ImageAdapter::filled(3, 3, Color::WHITE);
        let chain = FilterChain::new().with(crate::LogicalOperationFilter::not());
        let region = ClipRegion::rect(Rect::new(1, 1, 1, 1));
        let out = chain.process_clipped(&img, &region).unwrap();
        assert_eq!(out.pixel(0, 0), Color::WHITE);
        assert_eq!(out.pixel(1, 1), Color::BLACK);
    }

    #[test]
    fn test_clipping_size_change_fails() {
        let img = ImageAdapter::new(4, 4);
        let region = ClipRegion::rect(Rect::new(0, 0, 2, 2));
        let err = Shrink.process_clipped(&img, &region).unwrap_err();
        assert!(matches!(err, OpsError::SizeMismatch(_)));
    }

    #[test]
    fn test_clipping_mask_mismatch_fails() {
        let img = ImageAdapter::new(4, 4);
        let region = ClipRegion::mask(2, 2, vec![true; 4]).unwrap();
        assert!(IdentityFilter.process_clipped(&img, &region).is_err());
    }

    #[test]
    fn test_default_set_param_unknown() {
        let err = IdentityFilter
            .set_param("Radius", ParamValue::Double(1.0))
            .unwrap_err();
        assert!(matches!(err, OpsError::UnknownParameter { .. }));
        assert!(IdentityFilter.set_param_text("Radius", "1").is_err());
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let img = ImageAdapter::filled(2, 1, Color::BLACK);
        let chain = FilterChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.process(&img).unwrap(), img);
    }
}
