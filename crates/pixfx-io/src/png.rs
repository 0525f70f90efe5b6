//! PNG reading and writing.
//!
//! Decoding accepts grayscale, grayscale+alpha, RGB, RGBA and palette images
//! at any bit depth. Palette and sub-byte images are expanded by the decoder;
//! 16-bit samples are rounded to 8 bits. Everything becomes a byte-depth
//! [`ImageAdapter`].
//!
//! Encoding always writes 8-bit RGBA. Empty pixels are written as
//! transparent black.
//!
//! # Example
//!
//! ```rust,ignore
//! use pixfx_io::png;
//!
//! let image = png::read("input.png")?;
//! png::write("output.png", &image)?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::Path;

use pixfx_core::ImageAdapter;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Reads a PNG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageAdapter> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::file(path, e))?;
    let image = read_from(BufReader::new(file))?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "read png");
    Ok(image)
}

/// Decodes a PNG held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<ImageAdapter> {
    read_from(Cursor::new(bytes))
}

/// Decodes a PNG stream.
pub fn read_from<R: BufRead + Seek>(reader: R) -> IoResult<ImageAdapter> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let data = &buf[..info.buffer_size()];
    let (width, height) = (info.width as usize, info.height as usize);
    trace!(width, height, color = ?info.color_type, depth = ?info.bit_depth, "decode png");

    let samples: Vec<u8> = match info.bit_depth {
        png::BitDepth::Eight => data.to_vec(),
        png::BitDepth::Sixteen => data
            .chunks_exact(2)
            .map(|s| reduce_u16(u16::from_be_bytes([s[0], s[1]])))
            .collect(),
        depth => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                info.color_type, depth
            )));
        }
    };

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => samples,
        png::ColorType::Rgb => samples
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => samples.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
            .collect(),
        color_type => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                color_type, info.bit_depth
            )));
        }
    };

    Ok(ImageAdapter::from_rgba8(width, height, &rgba)?)
}

/// Writes an image as an 8-bit RGBA PNG.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageAdapter) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| IoError::file(path, e))?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, image)?;
    writer.flush()?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "wrote png");
    Ok(())
}

/// Encodes an image into PNG bytes.
pub fn encode(image: &ImageAdapter) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    write_to(&mut out, image)?;
    Ok(out)
}

/// Encodes an image into a stream.
pub fn write_to<W: Write>(writer: W, image: &ImageAdapter) -> IoResult<()> {
    let (width, height) = image.dimensions();
    let too_large = || IoError::TooLarge { width, height };
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;

    let mut encoder = png::Encoder::new(writer, w, h);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .write_image_data(&image.to_rgba8())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .finish()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(())
}

/// Rounds a 16-bit sample to 8 bits.
#[inline]
fn reduce_u16(v: u16) -> u8 {
    ((v as u32 + 128) / 257) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::Color;

    fn encode_raw(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn test_roundtrip_rgba() {
        let img = ImageAdapter::new(5, 3).map_indexed(|x, y, _| {
            Color::from_argb8((x * 50) as u8, (y * 80) as u8, 7, 250)
        });
        let bytes = encode(&img).unwrap();
        assert_eq!(decode(&bytes).unwrap(), img);
    }

    #[test]
    fn test_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let img = ImageAdapter::filled(4, 4, Color::from_argb8(255, 1, 2, 3));
        write(&path, &img).unwrap();
        assert_eq!(read(&path).unwrap(), img);
    }

    #[test]
    fn test_empty_pixels_written_transparent() {
        let mut img = ImageAdapter::filled(2, 1, Color::WHITE);
        img.set(1, 0, Color::EMPTY);
        let back = decode(&encode(&img).unwrap()).unwrap();
        assert_eq!(back.pixel(1, 0), Color::TRANSPARENT);
    }

    #[test]
    fn test_gray_expands() {
        let bytes = encode_raw(2, 1, png::ColorType::Grayscale, png::BitDepth::Eight, &[10, 200]);
        let img = decode(&bytes).unwrap();
        assert_eq!(img.pixel(1, 0), Color::from_argb8(255, 200, 200, 200));
    }

    #[test]
    fn test_gray_alpha_expands() {
        let bytes = encode_raw(1, 1, png::ColorType::GrayscaleAlpha, png::BitDepth::Eight, &[60, 128]);
        assert_eq!(decode(&bytes).unwrap().pixel(0, 0), Color::from_argb8(128, 60, 60, 60));
    }

    #[test]
    fn test_sixteen_bit_reduced() {
        let px: [u16; 3] = [0xFFFF, 0x8080, 0x0000];
        let data: Vec<u8> = px.iter().flat_map(|v| v.to_be_bytes()).collect();
        let bytes = encode_raw(1, 1, png::ColorType::Rgb, png::BitDepth::Sixteen, &data);
        let c = decode(&bytes).unwrap().pixel(0, 0).to_argb8();
        assert_eq!((c.a, c.r, c.g, c.b), (255, 255, 128, 0));
    }

    #[test]
    fn test_missing_file() {
        let err = read("/nonexistent/pixfx.png").unwrap_err();
        assert!(matches!(err, IoError::File { .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(decode(b"not a png"), Err(IoError::DecodeError(_))));
    }
}
