//! # pixfx-io
//!
//! Image file boundary for pixfx. Files are decoded straight into a
//! byte-depth [`ImageAdapter`] and encoded back from one; filters never see
//! file formats.
//!
//! - [`png`] - PNG reading and writing
//! - [`read`] / [`write`] - Format chosen from the file extension
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pixfx_io::{read, write};
//!
//! let image = read("input.png")?;
//! write("output.png", &image)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod png;

use std::path::Path;

use pixfx_core::ImageAdapter;

pub use error::{IoError, IoResult};

/// File formats known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable Network Graphics.
    Png,
}

impl Format {
    /// Detects the format from a path's extension.
    ///
    /// ```rust
    /// use pixfx_io::Format;
    ///
    /// assert_eq!(Format::from_path("a/B.PNG").unwrap(), Format::Png);
    /// assert!(Format::from_path("b.tga").is_err());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Format::Png),
            _ => Err(IoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads an image, choosing the decoder from the extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageAdapter> {
    match Format::from_path(&path)? {
        Format::Png => self::png::read(path),
    }
}

/// Writes an image, choosing the encoder from the extension.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageAdapter) -> IoResult<()> {
    match Format::from_path(&path)? {
        Format::Png => self::png::write(path, image),
    }
}
