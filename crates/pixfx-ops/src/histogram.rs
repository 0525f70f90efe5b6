//! Per-channel histograms and the stretch / equalize filters.
//!
//! A [`Histogram`] keeps, for each of red, green and blue, 256 buckets of
//! pixel *indices* keyed by the byte value of that channel. Remapping a
//! bucket moves its indices; [`Histogram::reconstitute`] then writes the new
//! values back into a copy of the image. Alpha is never touched and empty
//! pixels are never bucketed.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_ops::{Filter, HistogramStretchFilter};
//!
//! let mut img = ImageAdapter::filled(2, 1, Color::from_argb8(255, 100, 100, 100));
//! img.set(1, 0, Color::from_argb8(255, 150, 150, 150));
//! let out = HistogramStretchFilter.process(&img).unwrap();
//! assert_eq!(out.pixel(0, 0).to_argb8().r, 0);
//! assert_eq!(out.pixel(1, 0).to_argb8().r, 255);
//! ```

use pixfx_core::{Channel, ImageAdapter};
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

use crate::{Filter, OpsResult};

/// Number of buckets per channel.
pub const BUCKETS: usize = 256;

/// Bucketed pixel indices for the three color channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    channels: [Vec<Vec<usize>>; 3],
}

fn channel_slot(channel: Channel) -> Option<usize> {
    match channel {
        Channel::Red => Some(0),
        Channel::Green => Some(1),
        Channel::Blue => Some(2),
        Channel::Alpha => None,
    }
}

impl Histogram {
    /// Buckets every non-empty pixel of `image`.
    pub fn from_image(image: &ImageAdapter) -> Self {
        let mut channels: [Vec<Vec<usize>>; 3] = std::array::from_fn(|_| vec![Vec::new(); BUCKETS]);
        for (i, px) in image.as_slice().iter().enumerate() {
            if px.is_empty() {
                continue;
            }
            let b = px.to_argb8();
            channels[0][b.r as usize].push(i);
            channels[1][b.g as usize].push(i);
            channels[2][b.b as usize].push(i);
        }
        Self { channels }
    }

    fn buckets(&self, channel: Channel) -> Option<&Vec<Vec<usize>>> {
        channel_slot(channel).map(|slot| &self.channels[slot])
    }

    /// Number of pixels with `value` in `channel`. Alpha is not tracked.
    pub fn count(&self, channel: Channel, value: u8) -> usize {
        self.buckets(channel)
            .map(|b| b[value as usize].len())
            .unwrap_or(0)
    }

    /// Number of bucketed pixels.
    pub fn total(&self) -> usize {
        self.channels[0].iter().map(Vec::len).sum()
    }

    /// Lowest and highest occupied bucket of `channel`.
    pub fn range(&self, channel: Channel) -> Option<(u8, u8)> {
        let buckets = self.buckets(channel)?;
        let min = buckets.iter().position(|b| !b.is_empty())?;
        let max = buckets.iter().rposition(|b| !b.is_empty())?;
        Some((min as u8, max as u8))
    }

    /// Moves every bucket `i` of each channel to `map(slot, i)`.
    fn remap<F>(&mut self, map: F)
    where
        F: Fn(usize, usize) -> usize,
    {
        for (slot, buckets) in self.channels.iter_mut().enumerate() {
            let mut next = vec![Vec::new(); BUCKETS];
            for (i, bucket) in buckets.iter_mut().enumerate() {
                if bucket.is_empty() {
                    continue;
                }
                let target = map(slot, i).min(BUCKETS - 1);
                next[target].append(bucket);
            }
            *buckets = next;
        }
    }

    /// Linearly stretches each channel so its range becomes `0..=255`.
    ///
    /// A channel holding a single value is left unchanged.
    pub fn stretch(&mut self) {
        let ranges: Vec<Option<(usize, usize)>> = [Channel::Red, Channel::Green, Channel::Blue]
            .into_iter()
            .map(|c| self.range(c).map(|(lo, hi)| (lo as usize, hi as usize)))
            .collect();
        self.remap(|slot, i| match ranges[slot] {
            Some((lo, hi)) if hi > lo => ((i - lo) as f64 * 255.0 / (hi - lo) as f64 + 0.5).floor() as usize,
            _ => i,
        });
    }

    /// Equalizes each channel: bucket `i` moves to the midpoint of its
    /// cumulative share.
    pub fn equalize(&mut self) {
        let total = self.total();
        if total == 0 {
            return;
        }
        let maps: Vec<Vec<usize>> = self
            .channels
            .iter()
            .map(|buckets| {
                let mut cum_before = 0usize;
                buckets
                    .iter()
                    .map(|b| {
                        let count = b.len();
                        let mid = cum_before as f64 + count as f64 / 2.0;
                        cum_before += count;
                        (0.5 + mid * 255.0 / total as f64).floor() as usize
                    })
                    .collect()
            })
            .collect();
        self.remap(|slot, i| maps[slot][i]);
    }

    /// Writes the bucket values back into a copy of `image`.
    pub fn reconstitute(&self, image: &ImageAdapter) -> ImageAdapter {
        let mut out = image.clone();
        let width = image.width().max(1);
        let channels = [Channel::Red, Channel::Green, Channel::Blue];
        for (buckets, channel) in self.channels.iter().zip(channels) {
            for (value, bucket) in buckets.iter().enumerate() {
                let v = value as f64 / 255.0;
                for &i in bucket {
                    let (x, y) = (i % width, i / width);
                    let px = out.pixel(x, y);
                    out.set(x, y, px.with_channel(channel, v));
                }
            }
        }
        out
    }
}

/// Stretches each color channel to the full byte range.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramStretchFilter;

impl Filter for HistogramStretchFilter {
    fn name(&self) -> &'static str {
        "HistogramStretch"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let mut hist = Histogram::from_image(source);
        if hist.total() == 0 {
            warn!("histogram stretch on an image without assigned pixels");
            return Ok(source.clone());
        }
        hist.stretch();
        Ok(hist.reconstitute(source))
    }
}

/// Equalizes each color channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramEqualizeFilter;

impl Filter for HistogramEqualizeFilter {
    fn name(&self) -> &'static str {
        "HistogramEqualize"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let mut hist = Histogram::from_image(source);
        if hist.total() == 0 {
            warn!("histogram equalize on an image without assigned pixels");
            return Ok(source.clone());
        }
        hist.equalize();
        Ok(hist.reconstitute(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::Color;

    fn ramp(values: &[u8]) -> ImageAdapter {
        let mut img = ImageAdapter::new(values.len(), 1);
        for (x, &v) in values.iter().enumerate() {
            img.set(x, 0, Color::from_argb8(200, v, v / 2, 30));
        }
        img
    }

    #[test]
    fn test_buckets_skip_empty() {
        let mut img = ramp(&[10, 20, 20]);
        img.set(0, 0, Color::EMPTY);
        let hist = Histogram::from_image(&img);
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.count(Channel::Red, 20), 2);
        assert_eq!(hist.count(Channel::Red, 10), 0);
        assert_eq!(hist.range(Channel::Red), Some((20, 20)));
    }

    #[test]
    fn test_stretch_idempotent() {
        let img = ramp(&[40, 90, 120, 200, 60]);
        let once = HistogramStretchFilter.process(&img).unwrap();
        let twice = HistogramStretchFilter.process(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.pixel(0, 0).to_argb8().r, 0);
        assert_eq!(once.pixel(3, 0).to_argb8().r, 255);
    }

    #[test]
    fn test_stretch_single_value_unchanged() {
        let img = ramp(&[40, 90]);
        let out = HistogramStretchFilter.process(&img).unwrap();
        // Blue is 30 everywhere.
        assert_eq!(out.pixel(0, 0).to_argb8().b, 30);
        assert_eq!(out.pixel(1, 0).to_argb8().b, 30);
    }

    #[test]
    fn test_alpha_untouched() {
        let img = ramp(&[1, 2, 3]);
        let out = HistogramEqualizeFilter.process(&img).unwrap();
        assert!(out.pixels().all(|(_, _, c)| c.to_argb8().a == 200));
    }

    #[test]
    fn test_equalize_formula() {
        let img = ramp(&[0, 0, 0, 255]);
        let out = HistogramEqualizeFilter.process(&img).unwrap();
        // Bucket 0: floor(0.5 + 1.5 * 255 / 4) = 96; bucket 255: floor(0.5 + 3.5 * 255 / 4) = 223.
        assert_eq!(out.pixel(0, 0).to_argb8().r, 96);
        assert_eq!(out.pixel(3, 0).to_argb8().r, 223);
    }
}
