//! Convolution kernels.
//!
//! # Presets
//!
//! - [`Kernel::smooth`] - 3x3 mean
//! - [`Kernel::sharpen`] - 4-neighbour sharpen
//! - [`Kernel::edge_detect`] - Laplacian
//! - [`Kernel::emboss`]
//! - [`Kernel::sobel_x`], [`Kernel::sobel_y`] - Sobel gradients
//!
//! # Text form
//!
//! Rows are separated by `;`, values by whitespace or commas:
//!
//! ```rust
//! use pixfx_ops::Kernel;
//!
//! let k: Kernel = "0 -1 0; -1 5 -1; 0 -1 0".parse().unwrap();
//! assert_eq!(k, Kernel::sharpen());
//! assert_eq!(k.center(), (1, 1));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{OpsError, OpsResult};

/// Row-major kernel of weights.
///
/// Any non-zero size is accepted. The anchor is `(width / 2, height / 2)`,
/// which for even sizes sits right of and below the geometric middle.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Kernel {
    /// Creates a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a zero size, a length
    /// mismatch or a non-finite weight.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> OpsResult<Self> {
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidParameter(format!(
                "kernel size {}x{} must be non-zero",
                width, height
            )));
        }
        if data.len() != width * height {
            return Err(OpsError::InvalidParameter(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        if data.iter().any(|w| !w.is_finite()) {
            return Err(OpsError::InvalidParameter(
                "kernel weights must be finite".into(),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn fixed3(data: [f64; 9]) -> Self {
        Self {
            width: 3,
            height: 3,
            data: data.to_vec(),
        }
    }

    /// The 1x1 kernel `[1.0]`.
    pub fn identity() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![1.0],
        }
    }

    /// Mean of a `size x size` square (`size` is at least 1).
    pub fn box_mean(size: usize) -> Self {
        let size = size.max(1);
        let count = size * size;
        Self {
            width: size,
            height: size,
            data: vec![1.0 / count as f64; count],
        }
    }

    /// 3x3 mean.
    pub fn smooth() -> Self {
        Self::box_mean(3)
    }

    /// 4-neighbour sharpen.
    #[rustfmt::skip]
    pub fn sharpen() -> Self {
        Self::fixed3([
            0.0, -1.0, 0.0,
            -1.0, 5.0, -1.0,
            0.0, -1.0, 0.0,
        ])
    }

    /// Laplacian edge detector.
    #[rustfmt::skip]
    pub fn edge_detect() -> Self {
        Self::fixed3([
            0.0, -1.0, 0.0,
            -1.0, 4.0, -1.0,
            0.0, -1.0, 0.0,
        ])
    }

    /// Emboss, lit from the top left.
    #[rustfmt::skip]
    pub fn emboss() -> Self {
        Self::fixed3([
            -2.0, -1.0, 0.0,
            -1.0, 1.0, 1.0,
            0.0, 1.0, 2.0,
        ])
    }

    /// Horizontal Sobel gradient.
    #[rustfmt::skip]
    pub fn sobel_x() -> Self {
        Self::fixed3([
            -1.0, 0.0, 1.0,
            -2.0, 0.0, 2.0,
            -1.0, 0.0, 1.0,
        ])
    }

    /// Vertical Sobel gradient.
    #[rustfmt::skip]
    pub fn sobel_y() -> Self {
        Self::fixed3([
            -1.0, -2.0, -1.0,
            0.0, 0.0, 0.0,
            1.0, 2.0, 1.0,
        ])
    }

    /// Kernel width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Kernel height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Anchor position by integer division.
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Weight at (kx, ky).
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.data[ky * self.width + kx]
    }

    /// Row-major weights.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Fails unless both dimensions are odd.
    pub fn require_odd(&self) -> OpsResult<()> {
        if self.width % 2 == 0 || self.height % 2 == 0 {
            return Err(OpsError::InvalidParameter(format!(
                "kernel dimensions must be odd, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Fails when the kernel is larger than a `width x height` image.
    pub fn require_fits(&self, width: usize, height: usize) -> OpsResult<()> {
        if self.width > width || self.height > height {
            return Err(OpsError::InvalidDimensions(format!(
                "kernel {}x{} is larger than image {}x{}",
                self.width, self.height, width, height
            )));
        }
        Ok(())
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.data.chunks(self.width).enumerate() {
            if y > 0 {
                write!(f, "; ")?;
            }
            let cells: Vec<String> = row.iter().map(|w| w.to_string()).collect();
            write!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for Kernel {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut width = None;
        let mut data = Vec::new();
        let mut height = 0;
        for row in s.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let before = data.len();
            for cell in row
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|c| !c.is_empty())
            {
                let w = cell.parse::<f64>().map_err(|_| {
                    OpsError::InvalidParameter(format!("invalid kernel weight '{}'", cell))
                })?;
                data.push(w);
            }
            let row_len = data.len() - before;
            match width {
                None => width = Some(row_len),
                Some(w) if w != row_len => {
                    return Err(OpsError::InvalidParameter(format!(
                        "kernel rows have different lengths ({} and {})",
                        w, row_len
                    )));
                }
                _ => {}
            }
            height += 1;
        }
        Kernel::new(width.unwrap_or(0), height, data)
    }
}

/// Named kernels selectable from pipelines and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelPreset {
    /// [`Kernel::identity`]
    Identity,
    /// [`Kernel::smooth`]
    #[default]
    Smooth,
    /// [`Kernel::sharpen`]
    Sharpen,
    /// [`Kernel::edge_detect`]
    EdgeDetect,
    /// [`Kernel::emboss`]
    Emboss,
    /// [`Kernel::sobel_x`]
    SobelX,
    /// [`Kernel::sobel_y`]
    SobelY,
}

impl KernelPreset {
    /// All presets.
    pub const ALL: [KernelPreset; 7] = [
        KernelPreset::Identity,
        KernelPreset::Smooth,
        KernelPreset::Sharpen,
        KernelPreset::EdgeDetect,
        KernelPreset::Emboss,
        KernelPreset::SobelX,
        KernelPreset::SobelY,
    ];

    /// Builds the kernel.
    pub fn kernel(&self) -> Kernel {
        match self {
            KernelPreset::Identity => Kernel::identity(),
            KernelPreset::Smooth => Kernel::smooth(),
            KernelPreset::Sharpen => Kernel::sharpen(),
            KernelPreset::EdgeDetect => Kernel::edge_detect(),
            KernelPreset::Emboss => Kernel::emboss(),
            KernelPreset::SobelX => Kernel::sobel_x(),
            KernelPreset::SobelY => Kernel::sobel_y(),
        }
    }

    /// Preset name.
    pub fn name(&self) -> &'static str {
        match self {
            KernelPreset::Identity => "Identity",
            KernelPreset::Smooth => "Smooth",
            KernelPreset::Sharpen => "Sharpen",
            KernelPreset::EdgeDetect => "EdgeDetect",
            KernelPreset::Emboss => "Emboss",
            KernelPreset::SobelX => "SobelX",
            KernelPreset::SobelY => "SobelY",
        }
    }
}

impl FromStr for KernelPreset {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KernelPreset::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown kernel preset '{}'", s)))
    }
}

impl fmt::Display for KernelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(Kernel::new(0, 3, vec![]).is_err());
        assert!(Kernel::new(2, 2, vec![1.0; 3]).is_err());
        assert!(Kernel::new(1, 1, vec![f64::NAN]).is_err());
        assert!(Kernel::new(2, 2, vec![0.25; 4]).is_ok());
    }

    #[test]
    fn test_even_center() {
        let k = Kernel::new(4, 2, vec![0.0; 8]).unwrap();
        assert_eq!(k.center(), (2, 1));
        assert!(k.require_odd().is_err());
        assert!(Kernel::smooth().require_odd().is_ok());
    }

    #[test]
    fn test_presets_sum() {
        assert!((Kernel::smooth().sum() - 1.0).abs() < 1e-12);
        assert_eq!(Kernel::sharpen().sum(), 1.0);
        assert_eq!(Kernel::edge_detect().sum(), 0.0);
        assert_eq!(Kernel::sobel_x().sum(), 0.0);
    }

    #[test]
    fn test_parse_display() {
        let k: Kernel = "1, 2; 3, 4".parse().unwrap();
        assert_eq!((k.width(), k.height()), (2, 2));
        assert_eq!(k.weight(0, 1), 3.0);
        assert_eq!(k.to_string(), "1 2; 3 4");
        assert!("1 2; 3".parse::<Kernel>().is_err());
        assert!("".parse::<Kernel>().is_err());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("sobelx".parse::<KernelPreset>().unwrap(), KernelPreset::SobelX);
        assert!("blurry".parse::<KernelPreset>().is_err());
    }

    #[test]
    fn test_require_fits() {
        assert!(Kernel::smooth().require_fits(2, 5).is_err());
        assert!(Kernel::smooth().require_fits(3, 3).is_ok());
    }
}
