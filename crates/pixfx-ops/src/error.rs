//! Error types for filters.

use thiserror::Error;

use crate::param::ParamKind;

/// Error type for filter operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The filter has no parameter by that name.
    #[error("unknown parameter '{name}' for filter {filter}")]
    UnknownParameter {
        /// Filter name
        filter: String,
        /// Requested parameter name
        name: String,
    },

    /// A parameter was assigned a value of the wrong kind.
    #[error("parameter '{name}' expects {expected}, got {actual}")]
    ParameterType {
        /// Parameter name
        name: String,
        /// Kind the parameter holds
        expected: ParamKind,
        /// Kind that was supplied
        actual: ParamKind,
    },

    /// No filter is registered under the name.
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    /// The transform has no inverse.
    #[error("matrix is not invertible (determinant {0})")]
    SingularMatrix(f64),

    /// Data model failure (bounds, buffer sizes, clip masks).
    #[error(transparent)]
    Core(#[from] pixfx_core::Error),
}

impl OpsError {
    /// Creates an [`OpsError::UnknownParameter`] error.
    #[inline]
    pub fn unknown_parameter(filter: &str, name: &str) -> Self {
        Self::UnknownParameter {
            filter: filter.to_string(),
            name: name.to_string(),
        }
    }

    /// Creates an [`OpsError::ParameterType`] error.
    #[inline]
    pub fn parameter_type(name: &str, expected: ParamKind, actual: ParamKind) -> Self {
        Self::ParameterType {
            name: name.to_string(),
            expected,
            actual,
        }
    }

    /// Returns `true` for errors caused by the caller's arguments
    /// rather than by the image data.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions(_)
                | Self::InvalidParameter(_)
                | Self::UnknownParameter { .. }
                | Self::ParameterType { .. }
                | Self::UnknownFilter(_)
        )
    }
}

/// Result type for filter operations.
pub type OpsResult<T> = Result<T, OpsError>;
