//! Channel extraction and recombination.
//!
//! [`ChannelSplitFilter`] turns one channel into an opaque grayscale image;
//! [`ChannelJoinFilter`] writes the luminance of other images into selected
//! channels of the source. Splitting a channel and joining it back restores
//! that channel.

use pixfx_core::{Channel, Color, ImageAdapter};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::param::{Param, ParamValue};
use crate::{Filter, OpsError, OpsResult};

/// Extracts one channel as an opaque grayscale image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSplitFilter {
    /// Channel to extract.
    pub channel: Channel,
}

impl Default for ChannelSplitFilter {
    fn default() -> Self {
        Self { channel: Channel::Red }
    }
}

impl ChannelSplitFilter {
    /// Creates the filter.
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl Filter for ChannelSplitFilter {
    fn name(&self) -> &'static str {
        "ChannelSplit"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        let channel = self.channel;
        Ok(source.map(|c| {
            if c.is_empty() {
                return c;
            }
            let v = c.channel(channel);
            Color::rgb(v, v, v)
        }))
    }

    fn params(&self) -> Vec<Param> {
        vec![Param::new("Channel", "Alpha, Red, Green or Blue", ParamValue::text(self.channel))]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        match name {
            "Channel" => self.channel = value.into_enum(name)?,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        }
        Ok(())
    }
}

/// Replaces source channels with the luminance of other images.
///
/// Channels without an image are left as they are. Every given image must
/// have the source's dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelJoinFilter {
    /// Source of the red channel.
    pub red: Option<ImageAdapter>,
    /// Source of the green channel.
    pub green: Option<ImageAdapter>,
    /// Source of the blue channel.
    pub blue: Option<ImageAdapter>,
    /// Source of the alpha channel.
    pub alpha: Option<ImageAdapter>,
}

impl ChannelJoinFilter {
    /// Creates a filter with no channel images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for one channel image.
    pub fn with_channel(mut self, channel: Channel, image: ImageAdapter) -> Self {
        *self.slot_mut(channel) = Some(image);
        self
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut Option<ImageAdapter> {
        match channel {
            Channel::Alpha => &mut self.alpha,
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }

    fn inputs(&self) -> impl Iterator<Item = (Channel, &ImageAdapter)> {
        [
            (Channel::Alpha, &self.alpha),
            (Channel::Red, &self.red),
            (Channel::Green, &self.green),
            (Channel::Blue, &self.blue),
        ]
        .into_iter()
        .filter_map(|(channel, img)| img.as_ref().map(|i| (channel, i)))
    }
}

impl Filter for ChannelJoinFilter {
    fn name(&self) -> &'static str {
        "ChannelJoin"
    }

    fn apply(&self, source: &ImageAdapter) -> OpsResult<ImageAdapter> {
        for (channel, img) in self.inputs() {
            if !img.same_size(source) {
                return Err(OpsError::SizeMismatch(format!(
                    "{} channel image is {}x{}, source is {}x{}",
                    channel,
                    img.width(),
                    img.height(),
                    source.width(),
                    source.height()
                )));
            }
        }
        let mut out = source.clone();
        for (x, y, px) in source.pixels() {
            if px.is_empty() {
                continue;
            }
            let mut c = px;
            for (channel, img) in self.inputs() {
                c = c.with_channel(channel, img.pixel(x, y).or_transparent().luminance());
            }
            out.set(x, y, c);
        }
        Ok(out)
    }

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new("Red", "Image whose luminance becomes red", ParamValue::Image(self.red.clone())),
            Param::new("Green", "Image whose luminance becomes green", ParamValue::Image(self.green.clone())),
            Param::new("Blue", "Image whose luminance becomes blue", ParamValue::Image(self.blue.clone())),
            Param::new("Alpha", "Image whose luminance becomes alpha", ParamValue::Image(self.alpha.clone())),
        ]
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> OpsResult<()> {
        let channel: Channel = match name {
            "Red" => Channel::Red,
            "Green" => Channel::Green,
            "Blue" => Channel::Blue,
            "Alpha" => Channel::Alpha,
            _ => return Err(OpsError::unknown_parameter(self.name(), name)),
        };
        *self.slot_mut(channel) = value.into_image(name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImageAdapter {
        ImageAdapter::new(3, 2).map_indexed(|x, y, _| {
            Color::from_argb8(200, (x * 80) as u8, (y * 100) as u8, 17)
        })
    }

    #[test]
    fn test_split_is_opaque_gray() {
        let out = ChannelSplitFilter::new(Channel::Green).process(&sample()).unwrap();
        let px = out.pixel(1, 1).to_argb8();
        assert_eq!((px.a, px.r, px.g, px.b), (255, 100, 100, 100));
    }

    #[test]
    fn test_split_join_roundtrip() {
        let src = sample();
        let blue = ChannelSplitFilter::new(Channel::Blue).process(&src).unwrap();
        let flat = src.map(|c| c.with_channel(Channel::Blue, 0.0));
        let joined = ChannelJoinFilter::new()
            .with_channel(Channel::Blue, blue)
            .process(&flat)
            .unwrap();
        assert_eq!(joined, src);
    }

    #[test]
    fn test_join_size_mismatch() {
        let f = ChannelJoinFilter::new().with_channel(Channel::Red, ImageAdapter::new(1, 1));
        assert!(matches!(f.process(&sample()), Err(OpsError::SizeMismatch(_))));
    }

    #[test]
    fn test_join_image_param() {
        let mut f = ChannelJoinFilter::new();
        f.set_param("Alpha", ParamValue::Image(Some(ImageAdapter::filled(3, 2, Color::BLACK))))
            .unwrap();
        let out = f.process(&sample()).unwrap();
        assert_eq!(out.pixel(0, 0).a, 0.0);
        assert!(f.set_param("Alpha", ParamValue::Int(1)).is_err());
    }
}
