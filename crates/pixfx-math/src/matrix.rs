//! 2x3 affine matrix for geometric image transforms.
//!
//! [`Matrix2x3`] holds six doubles `(x1, y1, x2, y2, t1, t2)` and maps a
//! point as a row vector:
//!
//! ```text
//!                     | x1  y1 |
//! [x' y'] = [x  y] *  |        | + [t1  t2]
//!                     | x2  y2 |
//! ```
//!
//! Internally it is a [`glam::DAffine2`] whose x axis is `(x1, y1)`, y axis
//! is `(x2, y2)` and translation is `(t1, t2)`.
//!
//! # Composition
//!
//! The `then_*` methods append an operation: the returned matrix applies
//! `self` first, then the new operation.
//!
//! ```rust
//! use pixfx_math::Matrix2x3;
//!
//! let m = Matrix2x3::IDENTITY.then_scale(2.0, 3.0).then_translate(1.0, 1.0);
//! assert_eq!(m.transform_point(1.0, 1.0), (3.0, 4.0));
//! ```

use std::fmt;
use std::str::FromStr;

use glam::{DAffine2, DVec2};
use pixfx_core::Error;

/// Determinants with magnitude at or below this are treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// A 2D affine transform stored as a 2x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2x3 {
    inner: DAffine2,
}

impl Default for Matrix2x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix2x3 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        inner: DAffine2::IDENTITY,
    };

    /// Creates a matrix from its six coefficients.
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, t1: f64, t2: f64) -> Self {
        Self {
            inner: DAffine2::from_cols_array(&[x1, y1, x2, y2, t1, t2]),
        }
    }

    /// Pure translation.
    #[inline]
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            inner: DAffine2::from_translation(DVec2::new(dx, dy)),
        }
    }

    /// Pure axis scale.
    #[inline]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            inner: DAffine2::from_scale(DVec2::new(sx, sy)),
        }
    }

    /// Pure rotation by `degrees` about the origin.
    ///
    /// Positive angles turn +x toward +y, which is clockwise on screen
    /// because image y points down.
    #[inline]
    pub fn rotation(degrees: f64) -> Self {
        Self {
            inner: DAffine2::from_angle(degrees.to_radians()),
        }
    }

    /// Returns the coefficients as `[x1, y1, x2, y2, t1, t2]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 6] {
        self.inner.to_cols_array()
    }

    /// Returns the wrapped glam transform.
    #[inline]
    pub fn as_affine(&self) -> &DAffine2 {
        &self.inner
    }

    /// Determinant of the linear part, `x1 * y2 - y1 * x2`.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.inner.matrix2.determinant()
    }

    /// Returns `true` when the determinant is not (numerically) zero.
    #[inline]
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > SINGULAR_EPSILON
    }

    /// Returns `true` if every coefficient is within `1e-12` of the identity.
    pub fn is_identity(&self) -> bool {
        self.inner.abs_diff_eq(DAffine2::IDENTITY, 1e-12)
    }

    /// Closed-form inverse, or `None` for a singular matrix.
    ///
    /// ```rust
    /// use pixfx_math::Matrix2x3;
    ///
    /// let m = Matrix2x3::IDENTITY.then_rotate(30.0).then_translate(5.0, -2.0);
    /// let inv = m.inverse().unwrap();
    /// let (x, y) = inv.transform_point(m.transform_point(3.0, 4.0).0, m.transform_point(3.0, 4.0).1);
    /// assert!((x - 3.0).abs() < 1e-9 && (y - 4.0).abs() < 1e-9);
    ///
    /// assert!(Matrix2x3::scale(0.0, 1.0).inverse().is_none());
    /// ```
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_invertible() {
            return None;
        }
        let [x1, y1, x2, y2, t1, t2] = self.to_array();
        let det = self.determinant();
        let ix1 = y2 / det;
        let iy1 = -y1 / det;
        let ix2 = -x2 / det;
        let iy2 = x1 / det;
        let it1 = -(t1 * ix1 + t2 * ix2);
        let it2 = -(t1 * iy1 + t2 * iy2);
        Some(Self::new(ix1, iy1, ix2, iy2, it1, it2))
    }

    /// Maps a point through the transform.
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let p = self.inner.transform_point2(DVec2::new(x, y));
        (p.x, p.y)
    }

    /// Applies `self`, then `other`.
    #[inline]
    pub fn then(&self, other: &Matrix2x3) -> Self {
        Self {
            inner: other.inner * self.inner,
        }
    }

    /// Appends a translation.
    #[inline]
    pub fn then_translate(&self, dx: f64, dy: f64) -> Self {
        self.then(&Self::translation(dx, dy))
    }

    /// Appends an axis scale about the origin.
    #[inline]
    pub fn then_scale(&self, sx: f64, sy: f64) -> Self {
        self.then(&Self::scale(sx, sy))
    }

    /// Appends a rotation about the origin.
    #[inline]
    pub fn then_rotate(&self, degrees: f64) -> Self {
        self.then(&Self::rotation(degrees))
    }
}

impl From<DAffine2> for Matrix2x3 {
    fn from(inner: DAffine2) -> Self {
        Self { inner }
    }
}

impl From<Matrix2x3> for DAffine2 {
    fn from(m: Matrix2x3) -> Self {
        m.inner
    }
}

impl fmt::Display for Matrix2x3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x1, y1, x2, y2, t1, t2] = self.to_array();
        write!(f, "{} {} {} {} {} {}", x1, y1, x2, y2, t1, t2)
    }
}

/// Parses six numbers separated by whitespace or commas, in
/// `x1 y1 x2 y2 t1 t2` order.
impl FromStr for Matrix2x3 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|_| Error::other(format!("invalid matrix coefficient '{}'", part)))
            })
            .collect::<Result<Vec<f64>, Error>>()?;
        match values.as_slice() {
            &[x1, y1, x2, y2, t1, t2] => Ok(Self::new(x1, y1, x2, y2, t1, t2)),
            _ => Err(Error::other(format!(
                "matrix needs 6 coefficients, got {}",
                values.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_coefficient_layout() {
        let m = Matrix2x3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        // x' = x*x1 + y*x2 + t1, y' = x*y1 + y*y2 + t2
        assert_eq!(m.transform_point(1.0, 0.0), (6.0, 8.0));
        assert_eq!(m.transform_point(0.0, 1.0), (8.0, 10.0));
        assert_eq!(m.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.determinant(), -2.0);
    }

    #[test]
    fn test_then_translate_moves_offset() {
        let m = Matrix2x3::scale(2.0, 2.0).then_translate(3.0, 4.0);
        assert_eq!(m.to_array(), [2.0, 0.0, 0.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_then_scale_scales_offset() {
        let m = Matrix2x3::translation(1.0, 1.0).then_scale(2.0, 3.0);
        assert_eq!(m.to_array(), [2.0, 0.0, 0.0, 3.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rotate_90() {
        let m = Matrix2x3::IDENTITY.then_rotate(90.0);
        let (x, y) = m.transform_point(1.0, 0.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let m = Matrix2x3::new(2.0, 0.5, -1.0, 3.0, 7.0, -4.0);
        let inv = m.inverse().unwrap();
        let id = m.then(&inv);
        assert!(id.is_identity());
    }

    #[test]
    fn test_singular() {
        let m = Matrix2x3::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
        assert!(!m.is_invertible());
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_parse() {
        let m: Matrix2x3 = "1 0, 0 1 10 20".parse().unwrap();
        assert_eq!(m, Matrix2x3::translation(10.0, 20.0));
        assert!("1 2 3".parse::<Matrix2x3>().is_err());
        assert!("1 2 3 4 5 x".parse::<Matrix2x3>().is_err());
    }
}
