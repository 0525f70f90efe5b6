//! Bitwise operations on byte channel values.

use std::fmt;
use std::str::FromStr;

use pixfx_core::{Argb8, Color, ImageAdapter};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

/// Bitwise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum LogicalOp {
    And,
    Or,
    Xor,
    #[default]
    Not,
}

impl LogicalOp {
    #[inline]
    fn eval(&self, v: u8, operand: u8) -> u8 {
        match self {
            LogicalOp::And => v & operand,
            LogicalOp::Or => v | operand,
            LogicalOp::Xor => v ^ operand,
            LogicalOp::Not => !v,
        }
    }
}

impl FromStr for LogicalOp {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "xor" => Ok(Self::Xor),
            "not" => Ok(Self::Not),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown logical operation '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "And",
            Self::Or => "Or",
            Self::Xor => "Xor",
            Self::Not => "Not",
        })
    }
}

/// Applies a bitwise operation between each pixel and an operand color.
///
/// ```rust
/// use pixfx_core::{Color, ImageAdapter};
/// use pixfx_ops::{Filter, LogicalOperationFilter};
///
/// let img = ImageAdapter::filled(2, 2, Color::from_argb8(255, 12, 200, 7));
/// let not = LogicalOperationFilter::not();
/// let twice = not.process(&not.process(&img).unwrap()).unwrap();
/// assert_eq!(twice, img);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalOperationFilter {
    /// Operation.
    pub operation: LogicalOp,
    /// Second operand; ignored by `Not`.
    pub operand: Color,
    /// Also apply the operation to alpha.
    pub include_alpha: bool,
}

impl Default for LogicalOperationFilter {
    fn default() -> Self {
        Self::not()
    }
}

impl LogicalOperationFilter {
    /// Creates the filter.
    pub fn new(operation: LogicalOp, operand: Color) -> Self {
        Self {
            operation,
            operand,
            include_alpha: false,
        }
    }

    /// Inverts every color channel.
    pub fn not() -> Self {
        Self::new(LogicalOp::Not, Color::BLACK)
    }
}

impl Filter for LogicalOperationFilter {
    fn name(&self) -> &'static str {
        "LogicalOperation"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let op = self.operation;
        let rhs = self.operand.or_transparent().to_argb8();
        let include_alpha = self.include_alpha;
        Ok(source.map(|c| {
            if c.is_empty() {
                return c;
            }
            let v = c.to_argb8();
            let a = if include_alpha { op.eval(v.a, rhs.a) } else { v.a };
            Color::from(Argb8::new(
                a,
                op.eval(v.r, rhs.r),
                op.eval(v.g, rhs.g),
                op.eval(v.b, rhs.b),
            ))
        }))
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Operation", "And, Or, Xor or Not", ParamValue::text(self.operation)),
            Param::new("Operand", "Second operand color", ParamValue::Color(self.operand)),
            Param::new("IncludeAlpha", "Apply the operation to alpha too", ParamValue::Bool(self.include_alpha)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Operation" => self.operation = value.into_enum(name)?,
            "Operand" => self.operand = value.into_color(name)?,
            "IncludeAlpha" => self.include_alpha = value.into_bool(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img() -> ImageAdapter {
        ImageAdapter::filled(2, 1, Color::from_argb8(0xF0, 0b1100_1010, 0x0F, 0xFF))
    }

    #[test]
    fn test_and_or_xor() {
        let operand = Color::from_argb8(0xFF, 0b1010_1010, 0xF0, 0x0F);
        let and = LogicalOperationFilter::new(LogicalOp::And, operand).process(&img()).unwrap();
        assert_eq!(and.pixel(0, 0).to_argb8(), Argb8::new(0xF0, 0b1000_1010, 0x00, 0x0F));
        let or = LogicalOperationFilter::new(LogicalOp::Or, operand).process(&img()).unwrap();
        assert_eq!(or.pixel(0, 0).to_argb8(), Argb8::new(0xF0, 0b1110_1010, 0xFF, 0xFF));
        let xor = LogicalOperationFilter::new(LogicalOp::Xor, operand).process(&img()).unwrap();
        assert_eq!(xor.pixel(0, 0).to_argb8(), Argb8::new(0xF0, 0b0110_0000, 0xFF, 0xF0));
    }

    #[test]
    fn test_not_alpha() {
        let mut f = LogicalOperationFilter::not();
        f.include_alpha = true;
        let out = f.process(&img()).unwrap();
        assert_eq!(out.pixel(1, 0).to_argb8().a, 0x0F);
        assert_eq!(out.pixel(1, 0).to_argb8().b, 0x00);
    }

    #[test]
    fn test_not_twice_identity() {
        let src = ImageAdapter::new(3, 3).map_indexed(|x, y, _| {
            Color::from_argb8(255, (x * 70) as u8, (y * 90) as u8, 33)
        });
        let f = LogicalOperationFilter::not();
        assert_eq!(f.process(&f.process(&src).unwrap()).unwrap(), src);
    }
}
