//! 2D affine transform engine and the spatial transform filter.
//!
//! [`AffineTransform`] maps every destination pixel center back through the
//! inverse matrix and samples the source with an [`Interpolation`].
//! [`SpatialTransformFilter`] builds the matrix from rotation, scale and
//! translation about the image center, or takes an explicit matrix.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{Filter, SpatialTransformFilter};
//!
//! let img = ImageAdapter::new(8, 4).map_indexed(|x, y, _| {
//!     Color::from_argb8(255, (x * 30) as u8, (y * 60) as u8, 0)
//! });
//! let rotated = SpatialTransformFilter::new()
//!     .with_rotation(180.0)
//!     .with_resize_output(true)
//!     .process(&img)
//!     .unwrap();
//! assert_eq!(rotated.dimensions(), (8, 4));
//! assert_eq!(rotated.pixel(0, 0), img.pixel(7, 3));
//! ```

use pixfx_core::{Color, ImageAdapter};
use pixfx_math::{Matrix2x3, snap};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::parallel::build_rows;
use crate::{Filter, Interpolation, OpsError, OpsResult};

/// Snap distance for inverse-mapped coordinates.
pub const SNAP_EPSILON: f64 = 1e-9;

/// Largest destination a resize-to-fit transform may allocate, in pixels.
pub const MAX_CANVAS_PIXELS: usize = 1 << 28;

/// One step of a transform description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Offset by (dx, dy) pixels.
    Translate {
        /// Horizontal offset
        dx: f64,
        /// Vertical offset
        dy: f64,
    },
    /// Scale each axis about the origin.
    Scale {
        /// Horizontal factor
        sx: f64,
        /// Vertical factor
        sy: f64,
    },
    /// Rotate about the origin.
    Rotate {
        /// Angle in degrees
        degrees: f64,
    },
}

impl TransformOp {
    /// Appends this step to `m`.
    pub fn fold_into(&self, m: &Matrix2x3) -> Matrix2x3 {
        match *self {
            TransformOp::Translate { dx, dy } => m.then_translate(dx, dy),
            TransformOp::Scale { sx, sy } => m.then_scale(sx, sy),
            TransformOp::Rotate { degrees } => m.then_rotate(degrees),
        }
    }
}

/// Folds steps left to right into one matrix.
///
/// ```rust
/// use pixfx_ops::{TransformOp, fold_ops};
///
/// let m = fold_ops(&[
///     TransformOp::Scale { sx: 2.0, sy: 2.0 },
///     TransformOp::Translate { dx: 1.0, dy: 0.0 },
/// ]);
/// assert_eq!(m.transform_point(1.0, 1.0), (3.0, 2.0));
/// ```
pub fn fold_ops(ops: &[TransformOp]) -> Matrix2x3 {
    ops.iter()
        .fold(Matrix2x3::IDENTITY, |m, op| op.fold_into(&m))
}

/// Resampling transform driven by a single matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    /// Source-to-destination mapping.
    pub matrix: Matrix2x3,
    /// Point sampler.
    pub interpolation: Interpolation,
    /// Color for destination pixels that map outside the source.
    pub unassigned: Color,
    /// Size the output to the transformed bounds instead of the source size.
    pub resize_to_fit: bool,
    /// Box-average the source first when the transform shrinks it by 2x or more.
    pub prescale: bool,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::new(Matrix2x3::IDENTITY)
    }
}

impl AffineTransform {
    /// Transform with bilinear sampling and empty unassigned pixels.
    pub fn new(matrix: Matrix2x3) -> Self {
        Self {
            matrix,
            interpolation: Interpolation::Bilinear,
            unassigned: Color::EMPTY,
            resize_to_fit: false,
            prescale: false,
        }
    }

    /// Transform from a list of steps.
    pub fn from_ops(ops: &[TransformOp]) -> Self {
        Self::new(fold_ops(ops))
    }

    /// Resamples `source`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::SingularMatrix`] if the matrix has no inverse, and
    /// [`OpsError::InvalidDimensions`] if a resize-to-fit destination would
    /// exceed [`MAX_CANVAS_PIXELS`].
    pub fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        trace!(
            width = source.width(),
            height = source.height(),
            matrix = %self.matrix,
            "AffineTransform::apply"
        );
        if !self.matrix.is_invertible() {
            return Err(OpsError::SingularMatrix(self.matrix.determinant()));
        }
        if self.matrix.is_identity() {
            return Ok(source.clone());
        }

        let (w, h) = source.dimensions();
        let (dst_w, dst_h, matrix) = if self.resize_to_fit {
            fit_bounds(&self.matrix, w, h)?
        } else {
            (w, h, self.matrix)
        };
        debug!(dst_w, dst_h, matrix = %matrix, "affine destination");

        let mut sampled = None;
        let mut sample_matrix = matrix;
        if self.prescale {
            let (kx, ky) = prescale_factors(&matrix);
            if kx >= 2 || ky >= 2 {
                debug!(kx, ky, "affine prescale");
                sampled = Some(box_downsample(source, kx, ky));
                sample_matrix = Matrix2x3::scale(kx as f64, ky as f64).then(&matrix);
            }
        }
        let src = sampled.as_ref().unwrap_or(source);
        let inverse = sample_matrix
            .inverse()
            .ok_or_else(|| OpsError::SingularMatrix(sample_matrix.determinant()))?;

        let interpolation = self.interpolation;
        let unassigned = Some(self.unassigned);
        let pixels = build_rows(dst_w, dst_h, |y, row| {
            let cy = y as f64 + 0.5;
            for (x, px) in row.iter_mut().enumerate() {
                let (sx, sy) = inverse.transform_point(x as f64 + 0.5, cy);
                let sx = snap(sx - 0.5, SNAP_EPSILON);
                let sy = snap(sy - 0.5, SNAP_EPSILON);
                *px = interpolation.sample(src, sx, sy, unassigned);
            }
        });
        Ok(ImageAdapter::from_colors_with_depth(
            dst_w,
            dst_h,
            pixels,
            source.depth(),
        )?)
    }
}

/// Box factors per source axis.
///
/// The uniform shrink is `sqrt(|det|)`; scaling it by the axis length ratio
/// gives the shrink along each axis, `sqrt(|det| * ratio)` for x and
/// `sqrt(|det| / ratio)` for y. Axes that do not shrink by 2x or more get 1.
pub fn prescale_factors(m: &Matrix2x3) -> (usize, usize) {
    let [x1, y1, x2, y2, _, _] = m.to_array();
    let len_x = x1.hypot(y1);
    let len_y = x2.hypot(y2);
    let det = m.determinant().abs();
    if len_x <= 0.0 || len_y <= 0.0 || det <= 0.0 {
        return (1, 1);
    }
    let ratio = len_x / len_y;
    let factor = |shrink: f64| {
        if shrink < 1.0 {
            ((1.0 / shrink).floor() as usize).max(1)
        } else {
            1
        }
    };
    (factor((det * ratio).sqrt()), factor((det / ratio).sqrt()))
}

/// Bounding box of the forward-mapped source rectangle, and the matrix
/// shifted so that box starts at the origin.
fn fit_bounds(m: &Matrix2x3, w: usize, h: usize) -> OpsResult<(usize, usize, Matrix2x3)> {
    let corners = [
        m.transform_point(0.0, 0.0),
        m.transform_point(w as f64, 0.0),
        m.transform_point(0.0, h as f64),
        m.transform_point(w as f64, h as f64),
    ];
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y) in corners {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let fw = (max_x - min_x - SNAP_EPSILON).ceil().max(1.0);
    let fh = (max_y - min_y - SNAP_EPSILON).ceil().max(1.0);
    if !(fw * fh).is_finite() || fw * fh > MAX_CANVAS_PIXELS as f64 {
        return Err(OpsError::InvalidDimensions(format!(
            "transformed bounds {}x{} exceed {} pixels",
            fw, fh, MAX_CANVAS_PIXELS
        )));
    }
    Ok((fw as usize, fh as usize, m.then_translate(-min_x, -min_y)))
}

/// Averages `kx x ky` blocks. Edge blocks average only the pixels they
/// cover; empty pixels are left out, and an all-empty block stays empty.
pub fn box_downsample(source: &ImageAdapter, kx: usize, ky: usize) -> ImageAdapter {
    let (kx, ky) = (kx.max(1), ky.max(1));
    let (w, h) = source.dimensions();
    let dw = w.div_ceil(kx);
    let dh = h.div_ceil(ky);
    let pixels = build_rows(dw, dh, |by, row| {
        for (bx, px) in row.iter_mut().enumerate() {
            let mut sum = Color::TRANSPARENT;
            let mut count = 0usize;
            for y in by * ky..((by + 1) * ky).min(h) {
                for x in bx * kx..((bx + 1) * kx).min(w) {
                    let c = source.pixel(x, y);
                    if !c.is_empty() {
                        sum = sum + c;
                        count += 1;
                    }
                }
            }
            *px = if count == 0 {
                Color::EMPTY
            } else {
                sum / count as f64
            };
        }
    });
    ImageAdapter::from_colors_with_depth(dw, dh, pixels, source.depth())
        .unwrap_or_else(|_| source.blank_like(dw, dh))
}

/// Rotation, scale and translation of an image about its center.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialTransformFilter {
    /// Rotation in degrees.
    pub rotation: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Horizontal offset in pixels, applied last.
    pub translate_x: f64,
    /// Vertical offset in pixels, applied last.
    pub translate_y: f64,
    /// Size the output to fit the transformed image.
    pub resize_output: bool,
    /// Point sampler.
    pub interpolation: Interpolation,
    /// Color for pixels with no source.
    pub unassigned: Color,
    /// Box-average before strong downscaling.
    pub prescale: bool,
    /// Explicit matrix replacing rotation, scale and translation.
    pub matrix: Option<Matrix2x3>,
}

impl Default for SpatialTransformFilter {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            resize_output: false,
            interpolation: Interpolation::Bilinear,
            unassigned: Color::EMPTY,
            prescale: false,
            matrix: None,
        }
    }
}

impl SpatialTransformFilter {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rotation in degrees.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Sets both scale factors.
    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale_x = sx;
        self.scale_y = sy;
        self
    }

    /// Sets the translation.
    pub fn with_translation(mut self, dx: f64, dy: f64) -> Self {
        self.translate_x = dx;
        self.translate_y = dy;
        self
    }

    /// Enables resizing the output.
    pub fn with_resize_output(mut self, resize: bool) -> Self {
        self.resize_output = resize;
        self
    }

    /// Sets the sampler.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Uses an explicit matrix.
    pub fn with_matrix(mut self, matrix: Matrix2x3) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Matrix used for a `width x height` source.
    pub fn matrix_for(&self, width: usize, height: usize) -> Matrix2x3 {
        if let Some(m) = self.matrix {
            return m;
        }
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        fold_ops(&[
            TransformOp::Translate { dx: -cx, dy: -cy },
            TransformOp::Scale {
                sx: self.scale_x,
                sy: self.scale_y,
            },
            TransformOp::Rotate {
                degrees: self.rotation,
            },
            TransformOp::Translate { dx: cx, dy: cy },
            TransformOp::Translate {
                dx: self.translate_x,
                dy: self.translate_y,
            },
        ])
    }

    fn engine(&self, width: usize, height: usize) -> AffineTransform {
        AffineTransform {
            matrix: self.matrix_for(width, height),
            interpolation: self.interpolation,
            unassigned: self.unassigned,
            resize_to_fit: self.resize_output,
            prescale: self.prescale,
        }
    }
}

impl Filter for SpatialTransformFilter {
    fn name(&self) -> &'static str {
        "SpatialTransform"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        if !self.scale_x.is_finite() || !self.scale_y.is_finite() {
            return Err(OpsError::InvalidParameter("scale must be finite".into()));
        }
        self.engine(source.width(), source.height()).apply(source)
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Rotation", "Rotation in degrees about the image center", ParamValue::Double(self.rotation)),
            Param::new("ScaleX", "Horizontal scale about the image center", ParamValue::Double(self.scale_x)),
            Param::new("ScaleY", "Vertical scale about the image center", ParamValue::Double(self.scale_y)),
            Param::new("TranslateX", "Horizontal offset in pixels", ParamValue::Double(self.translate_x)),
            Param::new("TranslateY", "Vertical offset in pixels", ParamValue::Double(self.translate_y)),
            Param::new("ResizeOutputImage", "Size the output to the transformed bounds", ParamValue::Bool(self.resize_output)),
            Param::new("Interpolation", "Nearest, Bilinear or Bicubic", ParamValue::text(self.interpolation)),
            Param::new("UnassignedColor", "Color for pixels outside the source", ParamValue::Color(self.unassigned)),
            Param::new("Prescale", "Box-average before strong downscaling", ParamValue::Bool(self.prescale)),
            Param::new(
                "Matrix",
                "Explicit x1 y1 x2 y2 t1 t2 matrix (overrides the other transform parameters)",
                ParamValue::Matrix(self.matrix.unwrap_or(Matrix2x3::IDENTITY)),
            ),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Rotation" => self.rotation = value.into_double(name)?,
            "ScaleX" => self.scale_x = value.into_double(name)?,
            "ScaleY" => self.scale_y = value.into_double(name)?,
            "TranslateX" => self.translate_x = value.into_double(name)?,
            "TranslateY" => self.translate_y = value.into_double(name)?,
            "ResizeOutputImage" => self.resize_output = value.into_bool(name)?,
            "Interpolation" => self.interpolation = value.into_enum(name)?,
            "UnassignedColor" => self.unassigned = value.into_color(name)?,
            "Prescale" => self.prescale = value.into_bool(name)?,
            "Matrix" => self.matrix = Some(value.into_matrix(name)?),
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: usize, h: usize) -> ImageAdapter {
        ImageAdapter::new(w, h).map_indexed(|x, y, _| {
            Color::from_argb8(255, (x * 20) as u8, (y * 20) as u8, ((x + y) * 5) as u8)
        })
    }

    #[test]
    fn test_identity_is_clone() {
        let img = gradient(7, 5);
        let out = AffineTransform::new(Matrix2x3::IDENTITY).apply(&img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_singular_matrix() {
        let img = gradient(4, 4);
        let err = AffineTransform::new(Matrix2x3::scale(0.0, 1.0))
            .apply(&img)
            .unwrap_err();
        assert!(matches!(err, OpsError::SingularMatrix(_)));
    }

    #[test]
    fn test_rotate_180_resize() {
        let img = gradient(9, 6);
        let out = SpatialTransformFilter::new()
            .with_rotation(180.0)
            .with_resize_output(true)
            .process(&img)
            .unwrap();
        assert_eq!(out.dimensions(), (9, 6));
        assert_eq!(out.pixel(0, 0), img.pixel(8, 5));
        assert_eq!(out.pixel(8, 5), img.pixel(0, 0));
        assert_eq!(out.pixel(3, 2), img.pixel(5, 3));
    }

    #[test]
    fn test_integer_translate_nearest_exact() {
        let img = gradient(6, 6);
        let out = AffineTransform {
            interpolation: Interpolation::Nearest,
            ..AffineTransform::from_ops(&[TransformOp::Translate { dx: 2.0, dy: 1.0 }])
        }
        .apply(&img)
        .unwrap();
        assert_eq!(out.pixel(2, 1), img.pixel(0, 0));
        assert_eq!(out.pixel(5, 5), img.pixel(3, 4));
        assert!(out.pixel(0, 0).is_empty());
    }

    #[test]
    fn test_resize_to_fit_scale() {
        let img = gradient(4, 3);
        let mut t = AffineTransform::from_ops(&[TransformOp::Scale { sx: 2.0, sy: 2.0 }]);
        t.resize_to_fit = true;
        let out = t.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (8, 6));
    }

    #[test]
    fn test_rotate_90_resize_swaps_dimensions() {
        let img = gradient(5, 3);
        let out = SpatialTransformFilter::new()
            .with_rotation(90.0)
            .with_resize_output(true)
            .process(&img)
            .unwrap();
        assert_eq!(out.dimensions(), (3, 5));
    }

    #[test]
    fn test_prescale_downsample() {
        let img = ImageAdapter::filled(16, 16, Color::WHITE);
        let mut t = AffineTransform::from_ops(&[TransformOp::Scale { sx: 0.25, sy: 0.25 }]);
        t.resize_to_fit = true;
        t.prescale = true;
        let out = t.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.pixel(1, 1), Color::WHITE);
    }

    #[test]
    fn test_prescale_per_axis() {
        // Rows alternate white and black; only x shrinks.
        let img = ImageAdapter::new(16, 4).map_indexed(|_, y, _| {
            if y % 2 == 0 { Color::WHITE } else { Color::BLACK }
        });
        let m = Matrix2x3::scale(0.25, 1.0);
        assert_eq!(prescale_factors(&m), (4, 1));
        assert_eq!(prescale_factors(&Matrix2x3::scale(0.125, 1.0)), (8, 1));
        assert_eq!(prescale_factors(&Matrix2x3::scale(0.5, 0.25)), (2, 4));
        assert_eq!(prescale_factors(&Matrix2x3::rotation(30.0)), (1, 1));

        let mut t = AffineTransform::new(m);
        t.resize_to_fit = true;
        t.prescale = true;
        let out = t.apply(&img).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.pixel(1, 0), Color::WHITE);
        assert_eq!(out.pixel(1, 1), Color::BLACK);
    }

    #[test]
    fn test_resize_to_fit_canvas_limit() {
        let img = gradient(4, 4);
        let mut t = AffineTransform::from_ops(&[TransformOp::Scale { sx: 1e6, sy: 1e6 }]);
        t.resize_to_fit = true;
        let err = t.apply(&img).unwrap_err();
        assert!(matches!(err, OpsError::InvalidDimensions(_)));

        let huge = SpatialTransformFilter::new()
            .with_scale(1e9, 1e9)
            .with_resize_output(true)
            .process(&img);
        assert!(huge.is_err());
    }

    #[test]
    fn test_box_downsample() {
        let mut img = ImageAdapter::filled(3, 2, Color::BLACK);
        img.set(0, 0, Color::WHITE);
        let out = box_downsample(&img, 2, 2);
        assert_eq!(out.dimensions(), (2, 1));
        assert_eq!(out.pixel(0, 0).to_argb8().r, 64);
    }

    #[test]
    fn test_set_param_kinds() {
        let mut f = SpatialTransformFilter::new();
        f.set_param("Rotation", ParamValue::Double(45.0)).unwrap();
        f.set_param_text("interpolation", "Bicubic").unwrap();
        assert_eq!(f.interpolation, Interpolation::Bicubic);
        assert!(f.set_param("Rotation", ParamValue::Bool(true)).is_err());
        assert!(f.set_param("Shear", ParamValue::Double(1.0)).is_err());
        f.set_param_text("Matrix", "1 0 0 1 3 0").unwrap();
        assert_eq!(f.matrix_for(10, 10), Matrix2x3::translation(3.0, 0.0));
    }
}
