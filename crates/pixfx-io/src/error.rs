//! Error types for image I/O.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Could not open or create a file.
    #[error("{path}: {source}")]
    File {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Unsupported file extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported color type / bit depth combination.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Image too large for the format.
    #[error("image {width}x{height} exceeds the format limits")]
    TooLarge {
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },

    /// Decoded data does not form a valid image.
    #[error(transparent)]
    Image(#[from] pixfx_core::Error),
}

impl IoError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
