//! Block averaging.

use pixfx_core::{Color, ImageAdapter, Rect};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

/// Replaces each `block_size` square with the average of its assigned pixels.
///
/// Blocks on the right and bottom edges are clipped to the image. Empty
/// pixels stay empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelizeFilter {
    block_size: usize,
}

impl Default for PixelizeFilter {
    fn default() -> Self {
        Self { block_size: 8 }
    }
}

impl PixelizeFilter {
    /// Creates the filter.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] when `block_size` is zero.
    pub fn new(block_size: usize) -> OpsResult<Self> {
        let mut f = Self::default();
        f.set_block_size(block_size)?;
        Ok(f)
    }

    /// Sets the block edge length.
    pub fn set_block_size(&mut self, block_size: usize) -> OpsResult<()> {
        if block_size == 0 {
            return Err(OpsError::InvalidParameter("block size must be >= 1".into()));
        }
        self.block_size = block_size;
        Ok(())
    }

    /// Block edge length.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Filter for PixelizeFilter {
    fn name(&self) -> &'static str {
        "Pixelize"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let (w, h) = source.dimensions();
        let n = self.block_size;
        trace!(width = w, height = h, block_size = n, "pixelize");
        let mut out = source.clone();
        if n == 1 {
            return Ok(out);
        }
        for by in (0..h).step_by(n) {
            for bx in (0..w).step_by(n) {
                let block = Rect::new(bx, by, n.min(w - bx), n.min(h - by));
                let (sum, count) = block
                    .iter_coords()
                    .map(|(x, y)| source.pixel(x, y))
                    .filter(|c| !c.is_empty())
                    .fold((Color::TRANSPARENT, 0usize), |(s, k), c| (s + c, k + 1));
                if count == 0 {
                    continue;
                }
                let avg = sum / count as f64;
                for (x, y) in block.iter_coords() {
                    if !source.pixel(x, y).is_empty() {
                        out.set(x, y, avg);
                    }
                }
            }
        }
        Ok(out)
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("BlockSize", "Block edge length in pixels", ParamValue::Int(self.block_size as i64))]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "BlockSize" => self.set_block_size(value.into_usize(name)?),
            _ => Err(OpsError::unknown_parameter(self.name(), name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_average() {
        let mut img = ImageAdapter::filled(3, 2, Color::BLACK);
        img.set(0, 0, Color::WHITE);
        img.set(1, 1, Color::WHITE);
        let out = PixelizeFilter::new(2).unwrap().process(&img).unwrap();
        // 2 of 4 pixels in the first block are white.
        assert_eq!(out.pixel(0, 1).to_argb8().r, 128);
        assert_eq!(out.pixel(1, 0), out.pixel(0, 0));
        // Clipped 1x2 edge block stays black.
        assert_eq!(out.pixel(2, 0), Color::BLACK);
    }

    #[test]
    fn test_block_one_identity() {
        let img = ImageAdapter::new(4, 4).map_indexed(|x, y, _| Color::from_argb8(255, x as u8 * 60, y as u8, 0));
        assert_eq!(PixelizeFilter::new(1).unwrap().process(&img).unwrap(), img);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(PixelizeFilter::new(0).is_err());
        let mut f = PixelizeFilter::default();
        assert!(f.set_param("BlockSize", ParamValue::Int(-3)).is_err());
    }
}
