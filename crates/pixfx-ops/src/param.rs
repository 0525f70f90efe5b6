//! Dynamic parameter view over typed filter configuration.
//!
//! Every filter is configured through its own struct. For callers that only
//! know parameter names at runtime (XML pipelines, the CLI) each filter also
//! exposes [`Param`] descriptors and accepts [`ParamValue`] assignments by
//! name; see [`crate::Filter::params`] and [`crate::Filter::set_param`].
//!
//! ```rust
//! use pixfx_ops::{ParamKind, ParamValue};
//!
//! let v = ParamValue::parse(ParamKind::Double, "2.5").unwrap();
//! assert_eq!(v, ParamValue::Double(2.5));
//! assert!(ParamValue::parse(ParamKind::Int, "2.5").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use pixfx_core::{Color, ImageAdapter};
use pixfx_math::Matrix2x3;

use crate::{Kernel, OpsError, OpsResult};

/// Kind of value a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ParamKind {
    /// `true` / `false`
    Bool,
    /// Signed integer
    Int,
    /// Floating point number
    Double,
    /// `#AARRGGBB` / `#RRGGBB` color
    Color,
    /// Free text, also used for enumerations
    Text,
    /// Convolution kernel
    Kernel,
    /// 2x3 affine matrix
    Matrix,
    /// Image reference
    Image,
}

impl ParamKind {
    /// Lowercase name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Double => "double",
            ParamKind::Color => "color",
            ParamKind::Text => "text",
            ParamKind::Kernel => "kernel",
            ParamKind::Matrix => "matrix",
            ParamKind::Image => "image",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Color(Color),
    Text(String),
    Kernel(Kernel),
    Matrix(Matrix2x3),
    /// `None` means "not set".
    Image(Option<ImageAdapter>),
}

impl ParamValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Double(_) => ParamKind::Double,
            ParamValue::Color(_) => ParamKind::Color,
            ParamValue::Text(_) => ParamKind::Text,
            ParamValue::Kernel(_) => ParamKind::Kernel,
            ParamValue::Matrix(_) => ParamKind::Matrix,
            ParamValue::Image(_) => ParamKind::Image,
        }
    }

    /// Text value for an enumeration parameter.
    pub fn text(value: impl fmt::Display) -> Self {
        ParamValue::Text(value.to_string())
    }

    /// Parses text into a value of the given kind.
    ///
    /// Image values cannot be written as text; resolving an image reference
    /// is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] when the text does not parse.
    pub fn parse(kind: ParamKind, text: &str) -> OpsResult<Self> {
        let t = text.trim();
        let invalid = || OpsError::InvalidParameter(format!("'{}' is not a valid {}", t, kind));
        Ok(match kind {
            ParamKind::Bool => match t.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => ParamValue::Bool(true),
                "false" | "0" | "no" | "off" => ParamValue::Bool(false),
                _ => return Err(invalid()),
            },
            ParamKind::Int => ParamValue::Int(t.parse().map_err(|_| invalid())?),
            ParamKind::Double => {
                let v: f64 = t.parse().map_err(|_| invalid())?;
                if !v.is_finite() {
                    return Err(invalid());
                }
                ParamValue::Double(v)
            }
            ParamKind::Color => ParamValue::Color(t.parse().map_err(|_| invalid())?),
            ParamKind::Text => ParamValue::Text(t.to_string()),
            ParamKind::Kernel => ParamValue::Kernel(t.parse()?),
            ParamKind::Matrix => ParamValue::Matrix(t.parse().map_err(|_| invalid())?),
            ParamKind::Image => {
                return Err(OpsError::InvalidParameter(
                    "image parameters take an image reference, not text".into(),
                ));
            }
        })
    }

    fn mismatch(&self, name: &str, expected: ParamKind) -> OpsError {
        OpsError::parameter_type(name, expected, self.kind())
    }

    /// Unwraps a bool for parameter `name`.
    pub fn into_bool(self, name: &str) -> OpsResult<bool> {
        match self {
            ParamValue::Bool(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Bool)),
        }
    }

    /// Unwraps an integer for parameter `name`.
    pub fn into_int(self, name: &str) -> OpsResult<i64> {
        match self {
            ParamValue::Int(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Int)),
        }
    }

    /// Unwraps a non-negative integer for parameter `name`.
    pub fn into_usize(self, name: &str) -> OpsResult<usize> {
        let v = self.into_int(name)?;
        usize::try_from(v).map_err(|_| {
            OpsError::InvalidParameter(format!("{} must be non-negative, got {}", name, v))
        })
    }

    /// Unwraps a double for parameter `name`.
    pub fn into_double(self, name: &str) -> OpsResult<f64> {
        match self {
            ParamValue::Double(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Double)),
        }
    }

    /// Unwraps a color for parameter `name`.
    pub fn into_color(self, name: &str) -> OpsResult<Color> {
        match self {
            ParamValue::Color(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Color)),
        }
    }

    /// Unwraps text for parameter `name`.
    pub fn into_text(self, name: &str) -> OpsResult<String> {
        match self {
            ParamValue::Text(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Text)),
        }
    }

    /// Parses a text value into an enumeration.
    pub fn into_enum<T>(self, name: &str) -> OpsResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let text = self.into_text(name)?;
        text.parse::<T>()
            .map_err(|e| OpsError::InvalidParameter(format!("{}: {}", name, e)))
    }

    /// Unwraps a kernel for parameter `name`.
    pub fn into_kernel(self, name: &str) -> OpsResult<Kernel> {
        match self {
            ParamValue::Kernel(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Kernel)),
        }
    }

    /// Unwraps a matrix for parameter `name`.
    pub fn into_matrix(self, name: &str) -> OpsResult<Matrix2x3> {
        match self {
            ParamValue::Matrix(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Matrix)),
        }
    }

    /// Unwraps an optional image for parameter `name`.
    pub fn into_image(self, name: &str) -> OpsResult<Option<ImageAdapter>> {
        match self {
            ParamValue::Image(v) => Ok(v),
            other => Err(other.mismatch(name, ParamKind::Image)),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Double(v) => write!(f, "{}", v),
            ParamValue::Color(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
            ParamValue::Kernel(v) => write!(f, "{}", v),
            ParamValue::Matrix(v) => write!(f, "{}", v),
            ParamValue::Image(Some(img)) => write!(f, "<image {}x{}>", img.width(), img.height()),
            ParamValue::Image(None) => f.write_str("<none>"),
        }
    }
}

/// Self-describing parameter entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Name used by `set_param`.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Current value.
    pub value: ParamValue,
}

impl Param {
    /// Creates a parameter entry.
    pub fn new(name: &'static str, description: &'static str, value: ParamValue) -> Self {
        Self {
            name,
            description,
            value,
        }
    }

    /// Kind of the parameter.
    #[inline]
    pub fn kind(&self) -> ParamKind {
        self.value.kind()
    }

    /// Plain-data description, serializable with the `serde` feature.
    pub fn descriptor(&self) -> ParamDescriptor {
        ParamDescriptor {
            name: self.name,
            description: self.description,
            kind: self.kind(),
            value: self.value.to_string(),
        }
    }
}

/// Serializable summary of a [`Param`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParamDescriptor {
    /// Parameter name
    pub name: &'static str,
    /// Description
    pub description: &'static str,
    /// Value kind
    pub kind: ParamKind,
    /// Current value as text
    pub value: String,
}

/// Looks up the kind of `name` in a parameter list, ignoring ASCII case.
pub fn find_param<'a>(params: &'a [Param], name: &str) -> Option<&'a Param> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::Color;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(ParamValue::parse(ParamKind::Bool, "Yes").unwrap(), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse(ParamKind::Int, " 7 ").unwrap(), ParamValue::Int(7));
        assert_eq!(
            ParamValue::parse(ParamKind::Color, "#FF0000").unwrap(),
            ParamValue::Color(Color::rgb(1.0, 0.0, 0.0))
        );
        assert_eq!(
            ParamValue::parse(ParamKind::Kernel, "1").unwrap(),
            ParamValue::Kernel(Kernel::identity())
        );
        assert!(ParamValue::parse(ParamKind::Double, "inf").is_err());
        assert!(ParamValue::parse(ParamKind::Bool, "maybe").is_err());
        assert!(ParamValue::parse(ParamKind::Image, "a.png").is_err());
    }

    #[test]
    fn test_kind_mismatch_names_both_kinds() {
        let err = ParamValue::Text("x".into()).into_double("Gamma").unwrap_err();
        match err {
            OpsError::ParameterType {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "Gamma");
                assert_eq!(expected, ParamKind::Double);
                assert_eq!(actual, ParamKind::Text);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_into_usize_rejects_negative() {
        assert!(ParamValue::Int(-1).into_usize("Radius").is_err());
        assert_eq!(ParamValue::Int(3).into_usize("Radius").unwrap(), 3);
    }

    #[test]
    fn test_descriptor() {
        let p = Param::new("Radius", "Blur radius", ParamValue::Double(1.5));
        let d = p.descriptor();
        assert_eq!(d.kind, ParamKind::Double);
        assert_eq!(d.value, "1.5");
        let list = vec![p];
        assert!(find_param(&list, "radius").is_some());
        assert!(find_param(&list, "sigma").is_none());
    }
}
