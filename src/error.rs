use thiserror::Error;

/// Failure to locate a multipart boundary in a `Content-Type` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NotMultipartError {
    /// No `Content-Type` value was supplied.
    #[error("missing Content-Type header")]
    MissingContentType,
    /// The content type is not a `multipart/*` type.
    #[error("not a multipart content type")]
    NotMultipart,
    /// The content type is multipart but carries no `boundary` parameter.
    #[error("no multipart boundary")]
    MissingBoundary,
}

/// Byte-level multipart parser failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The state machine stopped before the end of the chunk.
    #[error("parser error, {offset} of {length} bytes parsed")]
    Rejected {
        /// Offset of the first byte that could not be parsed.
        offset: usize,
        /// Length of the chunk handed to the parser.
        length: usize,
    },
    /// A chunk was written before the parser received a boundary.
    #[error("parser has no boundary")]
    Uninitialized,
}

impl ParseError {
    /// Returns the offset of the offending byte, if known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Rejected { offset, .. } => Some(*offset),
            Self::Uninitialized => None,
        }
    }
}

/// Configuration-time validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configured numeric value must be strictly greater than zero.
    #[error("`{name}` must be greater than 0")]
    InvalidValue {
        /// Name of the offending setting.
        name: &'static str,
    },
}

/// Runtime error type used by `formwire`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MultipartError {
    /// Configuration error surfaced at runtime.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The request is not a usable multipart request.
    #[error(transparent)]
    NotMultipart(#[from] NotMultipartError),
    /// The body violates the multipart grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Reading from the chunk source failed.
    #[error("failed to read multipart body")]
    Io(#[from] std::io::Error),
    /// The chunk stream yielded an error.
    #[error("multipart body stream failed")]
    Stream(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    /// The body ended before the terminal boundary.
    #[error("multipart stream ended unexpectedly")]
    IncompleteStream,
}
