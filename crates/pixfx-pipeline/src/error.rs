//! Pipeline error types.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while parsing or evaluating a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// The document is XML but not a valid pipeline.
    #[error("invalid pipeline: {0}")]
    Malformed(String),

    /// A filter has no image to work on.
    #[error("filter '{0}' has no input image")]
    MissingInput(String),

    /// An alias was referenced before any filter defined it.
    #[error("unknown alias '{0}'")]
    UnknownAlias(String),

    /// Two filters register the same alias.
    #[error("alias '{0}' is already defined")]
    DuplicateAlias(String),

    /// `<ReturnValue>` is absent or empty.
    #[error("pipeline has no ReturnValue")]
    MissingReturnValue,

    /// `<SNAPSHOT/>` was used but no snapshot image was registered.
    #[error("no snapshot image registered")]
    MissingSnapshot,

    /// Filter construction, parameter or processing failure.
    #[error("filter '{filter}': {source}")]
    Filter {
        /// Filter element name.
        filter: String,
        /// Underlying error.
        #[source]
        source: pixfx_ops::OpsError,
    },

    /// Image file failure.
    #[error(transparent)]
    Io(#[from] pixfx_io::IoError),
}

impl PipelineError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub(crate) fn filter(filter: &str, source: pixfx_ops::OpsError) -> Self {
        Self::Filter {
            filter: filter.to_string(),
            source,
        }
    }

    /// The filter error behind this one, if any.
    pub fn ops_error(&self) -> Option<&pixfx_ops::OpsError> {
        match self {
            Self::Filter { source, .. } => Some(source),
            _ => None,
        }
    }
}
