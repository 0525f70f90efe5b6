//! Two-dimensional Daubechies-4 wavelet transform.
//!
//! Each level transforms the rows, then the columns, of the active
//! top-left region; the next level works on the quarter holding the
//! approximation coefficients. Signals wrap periodically. Only red, green and
//! blue are transformed; alpha passes through.
//!
//! Coefficients fall outside `[0, 1]`, so the forward transform always
//! produces an [`PixelDepth::Extended`] image.
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{Filter, WaveletDirection, WaveletFilter};
//!
//! let img = ImageAdapter::filled(8, 8, Color::rgb(0.25, 0.5, 0.75));
//! let coeffs = WaveletFilter::new(1, WaveletDirection::Forward).unwrap().process(&img).unwrap();
//! let back = WaveletFilter::new(1, WaveletDirection::Inverse).unwrap().process(&coeffs).unwrap();
//! assert!(back.pixel(3, 5).max_difference(&img.pixel(3, 5)) < 1e-9);
//! ```

use std::f64::consts::SQRT_2;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use pixfx_core::{Channel, Color, ImageAdapter, PixelDepth};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

/// Smallest signal length a level accepts.
pub const MIN_LENGTH: usize = 4;

struct Taps {
    low: [f64; 4],
    high: [f64; 4],
}

fn taps() -> &'static Taps {
    static TAPS: OnceLock<Taps> = OnceLock::new();
    TAPS.get_or_init(|| {
        let s3 = 3f64.sqrt();
        let n = 4.0 * SQRT_2;
        let h = [(1.0 + s3) / n, (3.0 + s3) / n, (3.0 - s3) / n, (1.0 - s3) / n];
        Taps {
            low: h,
            high: [h[3], -h[2], h[1], -h[0]],
        }
    })
}

/// One forward D4 step over `data`; approximations land in the first half.
pub fn d4_forward(data: &mut [f64]) {
    let n = data.len();
    if n < MIN_LENGTH {
        return;
    }
    let t = taps();
    let half = n / 2;
    let mut out = vec![0.0; n];
    for i in 0..half {
        for k in 0..4 {
            let v = data[(2 * i + k) % n];
            out[i] += t.low[k] * v;
            out[half + i] += t.high[k] * v;
        }
    }
    data.copy_from_slice(&out);
}

/// Exact inverse of [`d4_forward`].
pub fn d4_inverse(data: &mut [f64]) {
    let n = data.len();
    if n < MIN_LENGTH {
        return;
    }
    let t = taps();
    let half = n / 2;
    let mut out = vec![0.0; n];
    for i in 0..half {
        let (a, d) = (data[i], data[half + i]);
        for k in 0..4 {
            out[(2 * i + k) % n] += t.low[k] * a + t.high[k] * d;
        }
    }
    data.copy_from_slice(&out);
}

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum WaveletDirection {
    #[default]
    Forward,
    Inverse,
}

impl FromStr for WaveletDirection {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "inverse" => Ok(Self::Inverse),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown wavelet direction '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for WaveletDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "Forward",
            Self::Inverse => "Inverse",
        })
    }
}

/// Multi-level D4 transform of the color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveletFilter {
    levels: usize,
    /// Transform direction.
    pub direction: WaveletDirection,
}

impl Default for WaveletFilter {
    fn default() -> Self {
        Self {
            levels: 1,
            direction: WaveletDirection::Forward,
        }
    }
}

impl WaveletFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] when `levels` is zero.
    pub fn new(levels: usize, direction: WaveletDirection) -> OpsResult<Self> {
        let mut f = Self {
            levels: 1,
            direction,
        };
        f.set_levels(levels)?;
        Ok(f)
    }

    /// Sets the number of levels.
    pub fn set_levels(&mut self, levels: usize) -> OpsResult<()> {
        if levels == 0 {
            return Err(OpsError::InvalidParameter("wavelet levels must be >= 1".into()));
        }
        self.levels = levels;
        Ok(())
    }

    /// Number of levels.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Active region sizes, outermost level first.
    fn regions(&self, width: usize, height: usize) -> OpsResult<Vec<(usize, usize)>> {
        (0..self.levels)
            .map(|level| {
                let (w, h) = (width >> level, height >> level);
                if w < MIN_LENGTH || h < MIN_LENGTH || w % 2 != 0 || h % 2 != 0 {
                    return Err(OpsError::InvalidDimensions(format!(
                        "wavelet level {} needs an even region of at least {}x{}, got {}x{} (image {}x{})",
                        level + 1,
                        MIN_LENGTH,
                        MIN_LENGTH,
                        w,
                        h,
                        width,
                        height
                    )));
                }
                Ok((w, h))
            })
            .collect()
    }
}

/// Row-major plane of one channel.
fn plane(source: &ImageAdapter, channel: Channel) -> Vec<f64> {
    source
        .as_slice()
        .iter()
        .map(|c| c.or_transparent().channel(channel))
        .collect()
}

fn transform_region(data: &mut [f64], stride: usize, w: usize, h: usize, forward: bool) {
    let step = if forward { d4_forward } else { d4_inverse };
    let rows = |data: &mut [f64]| {
        for y in 0..h {
            step(&mut data[y * stride..y * stride + w]);
        }
    };
    let cols = |data: &mut [f64]| {
        let mut column = vec![0.0; h];
        for x in 0..w {
            for (y, v) in column.iter_mut().enumerate() {
                *v = data[y * stride + x];
            }
            step(&mut column);
            for (y, v) in column.iter().enumerate() {
                data[y * stride + x] = *v;
            }
        }
    };
    if forward {
        rows(data);
        cols(data);
    } else {
        cols(data);
        rows(data);
    }
}

impl Filter for WaveletFilter {
    fn name(&self) -> &'static str {
        "Wavelet"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let (width, height) = source.dimensions();
        let regions = self.regions(width, height)?;
        let forward = self.direction == WaveletDirection::Forward;
        debug!(levels = self.levels, direction = %self.direction, width, height, "wavelet");

        let planes: Vec<Vec<f64>> = Channel::COLOR
            .iter()
            .map(|&channel| {
                let mut data = plane(source, channel);
                if forward {
                    for &(w, h) in &regions {
                        transform_region(&mut data, width, w, h, true);
                    }
                } else {
                    for &(w, h) in regions.iter().rev() {
                        transform_region(&mut data, width, w, h, false);
                    }
                }
                data
            })
            .collect();

        let depth = if forward { PixelDepth::Extended } else { source.depth() };
        let pixels = source
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, px)| {
                if px.is_empty() {
                    return Color::EMPTY;
                }
                Color::new(px.a, planes[0][i], planes[1][i], planes[2][i])
            })
            .collect();
        Ok(ImageAdapter::from_colors_with_depth(width, height, pixels, depth)?)
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Levels", "Number of decomposition levels", ParamValue::Int(self.levels as i64)),
            Param::new("Direction", "Forward or Inverse", ParamValue::text(self.direction)),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Levels" => self.set_levels(value.into_usize(name)?)?,
            "Direction" => self.direction = value.into_enum(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}
