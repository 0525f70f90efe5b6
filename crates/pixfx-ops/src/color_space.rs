//! RGB to HSV / HSL / YCbCr conversions, encoded back into the color channels.
//!
//! | Space | red | green | blue |
//! |-------|-----|-------|------|
//! | HSV   | H   | S     | V    |
//! | HSL   | H   | S     | L    |
//! | YCbCr | Y   | Cb + 0.5 | Cr + 0.5 |
//!
//! Hue is normalized to `[0, 1)`. YCbCr uses the BT.601 luma weights.
//! Alpha is untouched.

use std::fmt;
use std::str::FromStr;

use pixfx_core::{Color, ImageAdapter, REC601_LUMA_B, REC601_LUMA_G, REC601_LUMA_R};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

const CB_SCALE: f64 = 2.0 * (1.0 - REC601_LUMA_B);
const CR_SCALE: f64 = 2.0 * (1.0 - REC601_LUMA_R);

/// Direction and target of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum ColorConversion {
    #[default]
    RgbToHsv,
    HsvToRgb,
    RgbToHsl,
    HslToRgb,
    RgbToYCbCr,
    YCbCrToRgb,
}

impl ColorConversion {
    /// All conversions.
    pub const ALL: [ColorConversion; 6] = [
        Self::RgbToHsv,
        Self::HsvToRgb,
        Self::RgbToHsl,
        Self::HslToRgb,
        Self::RgbToYCbCr,
        Self::YCbCrToRgb,
    ];

    /// Conversion name as used in pipelines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RgbToHsv => "RgbToHsv",
            Self::HsvToRgb => "HsvToRgb",
            Self::RgbToHsl => "RgbToHsl",
            Self::HslToRgb => "HslToRgb",
            Self::RgbToYCbCr => "RgbToYCbCr",
            Self::YCbCrToRgb => "YCbCrToRgb",
        }
    }

    /// Converts one `(r, g, b)` triple.
    pub fn convert(&self, rgb: (f64, f64, f64)) -> (f64, f64, f64) {
        let (r, g, b) = rgb;
        match self {
            Self::RgbToHsv => rgb_to_hsv(r, g, b),
            Self::HsvToRgb => hsv_to_rgb(r, g, b),
            Self::RgbToHsl => rgb_to_hsl(r, g, b),
            Self::HslToRgb => hsl_to_rgb(r, g, b),
            Self::RgbToYCbCr => rgb_to_ycbcr(r, g, b),
            Self::YCbCrToRgb => ycbcr_to_rgb(r, g, b),
        }
    }
}

impl FromStr for ColorConversion {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(key))
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown color conversion '{}'", s)))
    }
}

impl fmt::Display for ColorConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hue in `[0, 1)` plus the max and min channel.
fn hue(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    if d <= 0.0 {
        return (0.0, max, min);
    }
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    ((h / 6.0).rem_euclid(1.0), max, min)
}

/// `(H, S, V)` of an RGB triple.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (h, max, min) = hue(r, g, b);
    let s = if max > 0.0 { (max - min) / max } else { 0.0 };
    (h, s, max)
}

/// RGB of a chroma, hue and offset.
fn from_chroma(h: f64, c: f64, m: f64) -> (f64, f64, f64) {
    let hp = h.rem_euclid(1.0) * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (r + m, g + m, b + m)
}

/// RGB of an `(H, S, V)` triple.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let c = v * s;
    from_chroma(h, c, v - c)
}

/// `(H, S, L)` of an RGB triple.
pub fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let (h, max, min) = hue(r, g, b);
    let l = (max + min) / 2.0;
    let d = max - min;
    let s = if d <= 0.0 {
        0.0
    } else {
        d / (1.0 - (2.0 * l - 1.0).abs())
    };
    (h, s, l)
}

/// RGB of an `(H, S, L)` triple.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    from_chroma(h, c, l - c / 2.0)
}

/// BT.601 `(Y, Cb + 0.5, Cr + 0.5)` of an RGB triple.
pub fn rgb_to_ycbcr(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let y = r * REC601_LUMA_R + g * REC601_LUMA_G + b * REC601_LUMA_B;
    (y, (b - y) / CB_SCALE + 0.5, (r - y) / CR_SCALE + 0.5)
}

/// RGB of a BT.601 `(Y, Cb + 0.5, Cr + 0.5)` triple.
pub fn ycbcr_to_rgb(y: f64, cb: f64, cr: f64) -> (f64, f64, f64) {
    let b = y + (cb - 0.5) * CB_SCALE;
    let r = y + (cr - 0.5) * CR_SCALE;
    let g = (y - r * REC601_LUMA_R - b * REC601_LUMA_B) / REC601_LUMA_G;
    (r, g, b)
}

/// Converts every pixel between RGB and another color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSpaceFilter {
    /// Conversion to apply.
    pub conversion: ColorConversion,
}

impl ColorSpaceFilter {
    /// Creates the filter.
    pub fn new(conversion: ColorConversion) -> Self {
        Self { conversion }
    }
}

impl Filter for ColorSpaceFilter {
    fn name(&self) -> &'static str {
        "ColorSpace"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let conversion = self.conversion;
        Ok(source.map(|c| {
            if c.is_empty() {
                return c;
            }
            let (r, g, b) = conversion.convert((c.r, c.g, c.b));
            Color::new(c.a, r, g, b)
        }))
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new(
            "Conversion",
            "RgbToHsv, HsvToRgb, RgbToHsl, HslToRgb, RgbToYCbCr or YCbCrToRgb",
            ParamValue::text(self.conversion),
        )]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Conversion" => self.conversion = value.into_enum(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_triple(a: (f64, f64, f64), b: (f64, f64, f64)) {
        assert_abs_diff_eq!(a.0, b.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.1, b.1, epsilon = 1e-9);
        assert_abs_diff_eq!(a.2, b.2, epsilon = 1e-9);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_triple(rgb_to_hsv(1.0, 0.0, 0.0), (0.0, 1.0, 1.0));
        assert_triple(rgb_to_hsv(0.0, 1.0, 0.0), (1.0 / 3.0, 1.0, 1.0));
        assert_triple(rgb_to_hsv(0.0, 0.0, 1.0), (2.0 / 3.0, 1.0, 1.0));
        assert_triple(rgb_to_hsv(0.5, 0.5, 0.5), (0.0, 0.0, 0.5));
    }

    #[test]
    fn test_hue_range() {
        let (h, _, _) = rgb_to_hsv(1.0, 0.0, 0.001);
        assert!((0.0..1.0).contains(&h));
    }

    #[test]
    fn test_inverse_conversions() {
        let samples = [(0.2, 0.4, 0.9), (1.0, 0.5, 0.0), (0.3, 0.3, 0.3), (0.0, 0.0, 0.0)];
        for rgb in samples {
            let hsv = rgb_to_hsv(rgb.0, rgb.1, rgb.2);
            assert_triple(hsv_to_rgb(hsv.0, hsv.1, hsv.2), rgb);
            let hsl = rgb_to_hsl(rgb.0, rgb.1, rgb.2);
            assert_triple(hsl_to_rgb(hsl.0, hsl.1, hsl.2), rgb);
            let ycc = rgb_to_ycbcr(rgb.0, rgb.1, rgb.2);
            assert_triple(ycbcr_to_rgb(ycc.0, ycc.1, ycc.2), rgb);
        }
    }

    #[test]
    fn test_ycbcr_gray_is_neutral() {
        assert_triple(rgb_to_ycbcr(0.6, 0.6, 0.6), (0.6, 0.5, 0.5));
    }

    #[test]
    fn test_filter_keeps_alpha() {
        let img = ImageAdapter::filled(2, 2, Color::from_argb8(90, 255, 0, 0));
        let out = ColorSpaceFilter::new(ColorConversion::RgbToHsl).process(&img).unwrap();
        let px = out.pixel(0, 0).to_argb8();
        assert_eq!((px.a, px.r, px.g, px.b), (90, 0, 255, 128));
    }

    #[test]
    fn test_parse_conversion() {
        assert_eq!("ycbcrtorgb".parse::<ColorConversion>().unwrap(), ColorConversion::YCbCrToRgb);
        assert!("lab".parse::<ColorConversion>().is_err());
    }
}
