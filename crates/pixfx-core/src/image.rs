//! The image adapter: the uniform pixel surface every filter reads and writes.
//!
//! [`ImageAdapter`] is a `width x height` grid of [`Color`] values addressed
//! by zero-based `(x, y)` with `x` in `[0, width)` and `y` in `[0, height)`.
//! The concrete backing store of the caller (a platform bitmap, a PNG file)
//! is converted to and from the adapter at the edges; see
//! [`ImageAdapter::from_rgba8`] and [`ImageAdapter::to_rgba8`].
//!
//! # Pixel depth
//!
//! - [`PixelDepth::Byte`] (default) - every stored color goes through
//!   [`Color::quantize`], so channels stay representable as bytes.
//! - [`PixelDepth::Extended`] - colors are stored unclamped. Used for
//!   intermediate results such as wavelet coefficients.
//!
//! # Memory Layout
//!
//! Pixels are stored row-major, top-to-bottom. This is an implementation
//! detail; use the accessors.
//!
//! # Usage
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//!
//! let mut img = ImageAdapter::filled(4, 3, Color::WHITE);
//! img.set(1, 2, Color::rgb(1.0, 0.0, 0.0));
//! assert_eq!(img.pixel(1, 2), Color::rgb(1.0, 0.0, 0.0));
//!
//! // Clones are deep and independent.
//! let copy = img.clone();
//! img.set(1, 2, Color::BLACK);
//! assert_eq!(copy.pixel(1, 2), Color::rgb(1.0, 0.0, 0.0));
//! ```

use crate::{Color, Error, Rect, Result};

/// Storage precision of an [`ImageAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelDepth {
    /// Channels quantized to 8 bits on store.
    #[default]
    Byte,
    /// Channels stored as unclamped `f64`.
    Extended,
}

impl PixelDepth {
    /// Converts a color into the form this depth stores.
    #[inline]
    pub fn store(&self, color: Color) -> Color {
        match self {
            PixelDepth::Byte => color.quantize(),
            PixelDepth::Extended => color,
        }
    }
}

/// Owned 2D grid of colors with explicit dimensions.
#[derive(Clone, PartialEq)]
pub struct ImageAdapter {
    width: usize,
    height: usize,
    depth: PixelDepth,
    pixels: Vec<Color>,
}

impl ImageAdapter {
    /// Creates a byte-backed image filled with [`Color::TRANSPARENT`].
    ///
    /// ```rust
    /// use pixfx_core::{Color, ImageAdapter};
    ///
    /// let img = ImageAdapter::new(16, 8);
    /// assert_eq!(img.dimensions(), (16, 8));
    /// assert_eq!(img.pixel(0, 0), Color::TRANSPARENT);
    /// ```
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Creates a byte-backed image filled with `color`.
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self::filled_with_depth(width, height, color, PixelDepth::Byte)
    }

    /// Creates an image of the given depth filled with `color`.
    pub fn filled_with_depth(width: usize, height: usize, color: Color, depth: PixelDepth) -> Self {
        Self {
            width,
            height,
            depth,
            pixels: vec![depth.store(color); width * height],
        }
    }

    /// Creates an empty canvas with the same depth as `self` but new dimensions.
    pub fn blank_like(&self, width: usize, height: usize) -> Self {
        Self::filled_with_depth(width, height, Color::TRANSPARENT, self.depth)
    }

    /// Creates an image from row-major colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `pixels.len() != width * height`.
    pub fn from_colors(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self> {
        Self::from_colors_with_depth(width, height, pixels, PixelDepth::Byte)
    }

    /// Creates an image of the given depth from row-major colors.
    pub fn from_colors_with_depth(
        width: usize,
        height: usize,
        pixels: Vec<Color>,
        depth: PixelDepth,
    ) -> Result<Self> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} pixels, got {}", expected, pixels.len()),
            ));
        }
        let pixels = match depth {
            PixelDepth::Byte => pixels.into_iter().map(Color::quantize).collect(),
            PixelDepth::Extended => pixels,
        };
        Ok(Self {
            width,
            height,
            depth,
            pixels,
        })
    }

    /// Creates a byte-backed image from interleaved `R G B A` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the buffer length is not
    /// `width * height * 4`.
    pub fn from_rgba8(width: usize, height: usize, data: &[u8]) -> Result<Self> {
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        let pixels = data
            .chunks_exact(4)
            .map(|px| Color::from_argb8(px[3], px[0], px[1], px[2]))
            .collect();
        Ok(Self {
            width,
            height,
            depth: PixelDepth::Byte,
            pixels,
        })
    }

    /// Returns interleaved `R G B A` bytes. Empty pixels become transparent black.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            let c = px.or_transparent().to_argb8();
            out.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        out
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the storage depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Returns a copy stored at a different depth.
    ///
    /// Converting to [`PixelDepth::Byte`] quantizes every pixel.
    pub fn with_depth(&self, depth: PixelDepth) -> Self {
        Self {
            width: self.width,
            height: self.height,
            depth,
            pixels: self.pixels.iter().map(|&c| depth.store(c)).collect(),
        }
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns a rectangle covering the entire image.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if both images have the same dimensions.
    #[inline]
    pub fn same_size(&self, other: &ImageAdapter) -> bool {
        self.dimensions() == other.dimensions()
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[self.offset(x, y)]
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// Returns the pixel at signed coordinates, or `None` outside the image.
    #[inline]
    pub fn get_signed(&self, x: isize, y: isize) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }

    /// Sets the pixel at (x, y), converting it to the image's depth.
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = self.offset(x, y);
        self.pixels[offset] = self.depth.store(color);
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if (x, y) is outside the image.
    pub fn try_set(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        self.set(x, y, color);
        Ok(())
    }

    /// Fills the entire image with a color.
    pub fn fill(&mut self, color: Color) {
        let stored = self.depth.store(color);
        self.pixels.iter_mut().for_each(|px| *px = stored);
    }

    /// Returns a row of pixels.
    ///
    /// # Panics
    ///
    /// Panics if y >= height.
    #[inline]
    pub fn row(&self, y: usize) -> &[Color] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Returns all pixels, row-major.
    #[inline]
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }

    /// Replaces every row through `f(y, row)`, storing results at this image's depth.
    ///
    /// The closure writes raw colors; quantization for byte images happens
    /// after it returns.
    pub fn rows_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut [Color]),
    {
        if self.width == 0 {
            return;
        }
        let depth = self.depth;
        for (y, row) in self.pixels.chunks_exact_mut(self.width).enumerate() {
            f(y, row);
            if depth == PixelDepth::Byte {
                row.iter_mut().for_each(|px| *px = px.quantize());
            }
        }
    }

    /// Gives mutable access to the raw row-major storage.
    ///
    /// Callers that write through this slice must call
    /// [`ImageAdapter::normalize`] afterwards so byte images stay quantized.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Re-applies the depth conversion to every pixel.
    pub fn normalize(&mut self) {
        let depth = self.depth;
        self.pixels.iter_mut().for_each(|px| *px = depth.store(*px));
    }

    /// Iterates over all pixels with their coordinates.
    ///
    /// ```rust
    /// use pixfx_core::{Color, ImageAdapter};
    ///
    /// let img = ImageAdapter::filled(3, 2, Color::BLACK);
    /// assert_eq!(img.pixels().count(), 6);
    /// for (_x, _y, px) in img.pixels() {
    ///     assert_eq!(px, Color::BLACK);
    /// }
    /// ```
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        let width = self.width.max(1);
        self.pixels
            .iter()
            .enumerate()
            .map(move |(i, &c)| (i % width, i / width, c))
    }

    /// Returns a new image with `f` applied to every pixel.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(Color) -> Color,
    {
        Self {
            width: self.width,
            height: self.height,
            depth: self.depth,
            pixels: self.pixels.iter().map(|&c| self.depth.store(f(c))).collect(),
        }
    }

    /// Returns a new image with `f(x, y, color)` applied to every pixel.
    pub fn map_indexed<F>(&self, f: F) -> Self
    where
        F: Fn(usize, usize, Color) -> Color,
    {
        let mut out = self.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, f(x, y, self.pixel(x, y)));
            }
        }
        out
    }

    /// Copies a region into a new image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the rectangle exceeds the image.
    pub fn crop(&self, rect: Rect) -> Result<Self> {
        if rect.right() > self.width || rect.bottom() > self.height {
            return Err(Error::invalid_region(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                self.width,
                self.height,
            ));
        }
        let mut pixels = Vec::with_capacity(rect.width * rect.height);
        for y in rect.y..rect.bottom() {
            let start = self.offset(rect.x, y);
            pixels.extend_from_slice(&self.pixels[start..start + rect.width]);
        }
        Ok(Self {
            width: rect.width,
            height: rect.height,
            depth: self.depth,
            pixels,
        })
    }
}

impl std::fmt::Debug for ImageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAdapter")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let img = ImageAdapter::new(2, 2);
        assert!(img.pixels().all(|(_, _, c)| c == Color::TRANSPARENT));
        assert_eq!(img.depth(), PixelDepth::Byte);
    }

    #[test]
    fn test_byte_store_quantizes() {
        let mut img = ImageAdapter::new(1, 1);
        img.set(0, 0, Color::new(1.7, 0.3, -1.0, 0.5));
        let px = img.pixel(0, 0);
        assert_eq!(px.a, 1.0);
        assert_eq!(px.b, 0.0);
        assert_eq!(px.r, 77.0 / 255.0);
    }

    #[test]
    fn test_extended_store_keeps_values() {
        let mut img = ImageAdapter::filled_with_depth(1, 1, Color::BLACK, PixelDepth::Extended);
        img.set(0, 0, Color::new(1.0, -0.25, 3.0, 0.5));
        assert_eq!(img.pixel(0, 0).r, -0.25);
        assert_eq!(img.with_depth(PixelDepth::Byte).pixel(0, 0).g, 1.0);
    }

    #[test]
    fn test_empty_is_preserved() {
        let mut img = ImageAdapter::new(2, 1);
        img.set(1, 0, Color::EMPTY);
        assert!(img.pixel(1, 0).is_empty());
        assert_eq!(&img.to_rgba8()[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_from_colors_length_check() {
        assert!(ImageAdapter::from_colors(2, 2, vec![Color::BLACK; 3]).is_err());
        assert!(ImageAdapter::from_colors(2, 2, vec![Color::BLACK; 4]).is_ok());
    }

    #[test]
    fn test_rgba8_roundtrip() {
        let data: Vec<u8> = (0..2 * 3 * 4).map(|i| (i * 10) as u8).collect();
        let img = ImageAdapter::from_rgba8(2, 3, &data).unwrap();
        assert_eq!(img.to_rgba8(), data);
        // Channel order: bytes are R G B A, Color is ARGB.
        let px = img.pixel(0, 0).to_argb8();
        assert_eq!((px.r, px.g, px.b, px.a), (0, 10, 20, 30));
    }

    #[test]
    fn test_try_set_bounds() {
        let mut img = ImageAdapter::new(2, 2);
        assert!(img.try_set(2, 0, Color::BLACK).is_err());
        assert!(img.try_set(1, 1, Color::BLACK).is_ok());
    }

    #[test]
    fn test_crop() {
        let img = ImageAdapter::new(4, 4).map_indexed(|x, y, _| {
            Color::from_argb8(255, x as u8, y as u8, 0)
        });
        let cropped = img.crop(Rect::new(1, 2, 2, 2)).unwrap();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.pixel(0, 0), img.pixel(1, 2));
        assert!(img.crop(Rect::new(3, 3, 2, 2)).is_err());
    }

    #[test]
    fn test_rows_mut_quantizes() {
        let mut img = ImageAdapter::new(2, 2);
        img.rows_mut(|y, row| {
            for px in row.iter_mut() {
                *px = Color::rgb(0.3 + y as f64, 0.0, 0.0);
            }
        });
        assert_eq!(img.pixel(0, 0).r, 77.0 / 255.0);
        assert_eq!(img.pixel(0, 1).r, 1.0);
    }
}
