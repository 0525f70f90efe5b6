//! Color values used by every filter.
//!
//! # Representations
//!
//! - [`Color`] - four `f64` channels (alpha, red, green, blue) in the
//!   *extended* representation: `1.0` is full intensity, but values may go
//!   negative or above `1.0` while a filter is computing.
//! - [`Argb8`] - the bounded byte representation (0-255 per channel).
//!
//! Conversion from extended to byte happens in exactly one place,
//! [`Color::to_argb8`], which saturates and rounds. A byte-backed
//! [`ImageAdapter`](crate::ImageAdapter) runs every stored color through it.
//!
//! # The empty sentinel
//!
//! [`Color::EMPTY`] means "no color assigned" (for example a destination
//! pixel that has no source pixel after a geometric transform). It is
//! distinct from [`Color::TRANSPARENT`], which is a defined black with zero
//! alpha.
//!
//! ```rust
//! use pixfx_core::Color;
//!
//! let red = Color::from_argb8(255, 255, 0, 0);
//! assert_eq!(red.r, 1.0);
//! assert!(!red.is_empty());
//! assert!(Color::EMPTY.is_empty());
//! assert!(!Color::TRANSPARENT.is_empty());
//! ```

use crate::{Error, Result};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Rec.601 luminance coefficient for red channel.
pub const REC601_LUMA_R: f64 = 0.299;

/// Rec.601 luminance coefficient for green channel.
pub const REC601_LUMA_G: f64 = 0.587;

/// Rec.601 luminance coefficient for blue channel.
pub const REC601_LUMA_B: f64 = 0.114;

/// A color channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Opacity
    Alpha,
    /// Red
    Red,
    /// Green
    Green,
    /// Blue
    Blue,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 4] = [Channel::Alpha, Channel::Red, Channel::Green, Channel::Blue];

    /// Color channels only (alpha excluded).
    pub const COLOR: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Returns the channel name as used in pipeline documents.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Alpha => "Alpha",
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
        }
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Ok(Channel::Alpha),
            "r" | "red" => Ok(Channel::Red),
            "g" | "green" => Ok(Channel::Green),
            "b" | "blue" => Ok(Channel::Blue),
            _ => Err(Error::other(format!("unknown channel '{}'", s))),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte color, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Argb8 {
    /// Alpha
    pub a: u8,
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Argb8 {
    /// Creates a byte color.
    #[inline]
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Returns the channel value.
    #[inline]
    pub fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Alpha => self.a,
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    /// Returns a copy with one channel replaced.
    #[inline]
    pub fn with_channel(mut self, channel: Channel, value: u8) -> Self {
        match channel {
            Channel::Alpha => self.a = value,
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
        }
        self
    }
}

/// Extended-range ARGB color with an empty sentinel.
///
/// Arithmetic operators work on all four channels and always produce a
/// defined (non-empty) color. Use [`Color::saturate`] or
/// [`Color::to_argb8`] to bring values back into the displayable range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Alpha (opacity), 1.0 = opaque
    pub a: f64,
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
    empty: bool,
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl Color {
    /// No color assigned.
    pub const EMPTY: Color = Color { a: 0.0, r: 0.0, g: 0.0, b: 0.0, empty: true };

    /// Defined black with zero alpha.
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Opaque black.
    pub const BLACK: Color = Color::new(1.0, 0.0, 0.0, 0.0);

    /// Opaque white.
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from extended channel values.
    #[inline]
    pub const fn new(a: f64, r: f64, g: f64, b: f64) -> Self {
        Self { a, r, g, b, empty: false }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(1.0, r, g, b)
    }

    /// Creates a color from byte channels.
    ///
    /// ```rust
    /// use pixfx_core::Color;
    ///
    /// let c = Color::from_argb8(255, 0, 51, 255);
    /// assert_eq!(c.g, 0.2);
    /// ```
    #[inline]
    pub fn from_argb8(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self::new(
            a as f64 / 255.0,
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
        )
    }

    /// Returns `true` for the "no color assigned" sentinel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Returns [`Color::TRANSPARENT`] for the empty sentinel, `self` otherwise.
    #[inline]
    pub fn or_transparent(self) -> Self {
        if self.empty { Self::TRANSPARENT } else { self }
    }

    /// Returns `true` if the color is defined and has zero alpha.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        !self.empty && self.a <= 0.0
    }

    /// Clamps every channel to `[0, 1]`. The empty flag is preserved.
    #[inline]
    pub fn saturate(self) -> Self {
        Self {
            a: self.a.clamp(0.0, 1.0),
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            empty: self.empty,
        }
    }

    /// Saturates and rounds each channel to the nearest byte.
    ///
    /// This is the only extended → byte conversion in the crate.
    ///
    /// ```rust
    /// use pixfx_core::{Argb8, Color};
    ///
    /// let c = Color::new(1.5, 0.299, -0.2, 0.5);
    /// assert_eq!(c.to_argb8(), Argb8::new(255, 76, 0, 128));
    /// ```
    #[inline]
    pub fn to_argb8(&self) -> Argb8 {
        Argb8 {
            a: to_byte(self.a),
            r: to_byte(self.r),
            g: to_byte(self.g),
            b: to_byte(self.b),
        }
    }

    /// Rounds the color to byte precision, keeping the empty flag.
    #[inline]
    pub fn quantize(self) -> Self {
        if self.empty {
            return Self::EMPTY;
        }
        Self::from(self.to_argb8())
    }

    /// Returns the channel value.
    #[inline]
    pub fn channel(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Alpha => self.a,
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    /// Returns a copy with one channel replaced.
    #[inline]
    pub fn with_channel(mut self, channel: Channel, value: f64) -> Self {
        match channel {
            Channel::Alpha => self.a = value,
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
        }
        self.empty = false;
        self
    }

    /// Returns a copy with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f64) -> Self {
        self.with_channel(Channel::Alpha, a)
    }

    /// Applies `f` to red, green and blue; alpha and the empty flag are kept.
    #[inline]
    pub fn map_rgb<F: Fn(f64) -> f64>(self, f: F) -> Self {
        Self {
            a: self.a,
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            empty: self.empty,
        }
    }

    /// Rec.601 luminance of the color channels.
    ///
    /// ```rust
    /// use pixfx_core::Color;
    ///
    /// assert!((Color::rgb(1.0, 0.0, 0.0).luminance() - 0.299).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn luminance(&self) -> f64 {
        self.r * REC601_LUMA_R + self.g * REC601_LUMA_G + self.b * REC601_LUMA_B
    }

    /// Linear interpolation toward `other` (`t = 0` returns `self`).
    #[inline]
    pub fn lerp(self, other: Color, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Channel-wise absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            a: self.a.abs(),
            r: self.r.abs(),
            g: self.g.abs(),
            b: self.b.abs(),
            empty: self.empty,
        }
    }

    /// Maximum absolute channel difference, used by tests and comparisons.
    #[inline]
    pub fn max_difference(&self, other: &Color) -> f64 {
        (self.a - other.a)
            .abs()
            .max((self.r - other.r).abs())
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }
}

#[inline]
fn to_byte(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<Argb8> for Color {
    #[inline]
    fn from(c: Argb8) -> Self {
        Color::from_argb8(c.a, c.r, c.g, c.b)
    }
}

impl From<Color> for Argb8 {
    #[inline]
    fn from(c: Color) -> Self {
        c.to_argb8()
    }
}

impl Add for Color {
    type Output = Color;

    #[inline]
    fn add(self, rhs: Color) -> Color {
        Color::new(self.a + rhs.a, self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Sub for Color {
    type Output = Color;

    #[inline]
    fn sub(self, rhs: Color) -> Color {
        Color::new(self.a - rhs.a, self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: f64) -> Color {
        Color::new(self.a * rhs, self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Div<f64> for Color {
    type Output = Color;

    #[inline]
    fn div(self, rhs: f64) -> Color {
        Color::new(self.a / rhs, self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

impl fmt::Display for Color {
    /// Formats as `#AARRGGBB`, or `empty` for the sentinel.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            return f.write_str("empty");
        }
        let c = self.to_argb8();
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", c.a, c.r, c.g, c.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `#RRGGBB`, `#AARRGGBB`, `empty` or `transparent`.
    ///
    /// ```rust
    /// use pixfx_core::Color;
    ///
    /// let c: Color = "#80FF0000".parse().unwrap();
    /// assert_eq!(c.to_argb8().a, 0x80);
    /// assert!("empty".parse::<Color>().unwrap().is_empty());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "empty" => return Ok(Color::EMPTY),
            "transparent" => return Ok(Color::TRANSPARENT),
            _ => {}
        }
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| Error::other(format!("invalid color '{}': expected #RRGGBB or #AARRGGBB", s)))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::other(format!("invalid color '{}': not hexadecimal", s)));
        }
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| Error::other(format!("invalid color '{}': not hexadecimal", s)))?;
        let byte = |shift: u32| ((value >> shift) & 0xFF) as u8;
        match hex.len() {
            6 => Ok(Color::from_argb8(255, byte(16), byte(8), byte(0))),
            8 => Ok(Color::from_argb8(byte(24), byte(16), byte(8), byte(0))),
            _ => Err(Error::other(format!(
                "invalid color '{}': expected 6 or 8 hex digits",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_vs_transparent() {
        assert!(Color::EMPTY.is_empty());
        assert!(!Color::EMPTY.is_transparent());
        assert!(Color::TRANSPARENT.is_transparent());
        assert_ne!(Color::EMPTY, Color::TRANSPARENT);
        assert_eq!(Color::EMPTY.or_transparent(), Color::TRANSPARENT);
    }

    #[test]
    fn test_byte_roundtrip() {
        for v in [0u8, 1, 76, 127, 128, 254, 255] {
            let c = Color::from_argb8(v, v, v, v);
            assert_eq!(c.to_argb8(), Argb8::new(v, v, v, v));
        }
    }

    #[test]
    fn test_saturate_extended() {
        let c = Color::new(2.0, -0.5, 0.5, 1.0001).saturate();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn test_quantize_preserves_empty() {
        assert!(Color::EMPTY.quantize().is_empty());
        let q = Color::rgb(0.299, 0.0, 0.0).quantize();
        assert_eq!(q.to_argb8().r, 76);
    }

    #[test]
    fn test_arithmetic_defines_color() {
        let sum = Color::EMPTY + Color::rgb(0.1, 0.2, 0.3);
        assert!(!sum.is_empty());
        let half = Color::rgb(1.0, 0.5, 0.0) * 0.5;
        assert_relative_eq!(half.a, 0.5);
        assert_relative_eq!(half.g, 0.25);
    }

    #[test]
    fn test_lerp() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        let mid = a.lerp(b, 0.5);
        assert_relative_eq!(mid.r, 0.5);
        assert_relative_eq!(mid.a, 1.0);
    }

    #[test]
    fn test_parse_and_display() {
        let c: Color = "#FF00FF00".parse().unwrap();
        assert_eq!(c, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(c.to_string(), "#FF00FF00");
        let opaque: Color = "#102030".parse().unwrap();
        assert_eq!(opaque.to_argb8(), Argb8::new(255, 0x10, 0x20, 0x30));
        assert!("102030".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#+FFFFF".parse::<Color>().is_err());
        assert!("#-1234567".parse::<Color>().is_err());
        assert_eq!(Color::EMPTY.to_string(), "empty");
    }

    #[test]
    fn test_channel_access() {
        let c = Color::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(c.channel(Channel::Alpha), 0.1);
        assert_eq!(c.with_channel(Channel::Blue, 1.0).b, 1.0);
        assert_eq!("G".parse::<Channel>().unwrap(), Channel::Green);
        assert!(Color::EMPTY.with_channel(Channel::Red, 0.5).r == 0.5);
    }
}
