/// The category of a [StreamError], for callers that only need to branch on what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The medium was exhausted before the request was satisfied.
    NoMoreData,
    /// A read transferred a partial chunk and must be invoked again.
    Retry,
    /// The underlying medium failed.
    Io,
    /// The input is malformed for the format being decoded.
    Format,
    /// The stream does not provide the requested capability.
    NotSupported,
    /// An argument contradicts the stream's state or the data being read.
    InvalidArgument,
}

/// Any error that a [Stream](crate::traits::Stream) can return.
///
/// All operations report failure immediately through this type. The only case in which a caller
/// is expected to retry instead of propagating is [StreamError::Retry] from `read_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamError {
    /// The medium is exhausted. Raw transfers leave the outstanding bytes in the caller's slice.
    NoMoreData,

    /// Read side only: part of the request was transferred, call again with the remainder.
    Retry,

    /// The underlying medium failed, or a handshake found the stream in the wrong state.
    Io(&'static str),

    /// Malformed input, e.g. a corrupted codec group.
    Format(&'static str),

    /// The optional capability is not implemented by this stream.
    NotSupported,

    /// E.g. an array length that differs from what the container declared.
    InvalidArgument(&'static str),
}

impl StreamError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StreamError::NoMoreData => ErrorKind::NoMoreData,
            StreamError::Retry => ErrorKind::Retry,
            StreamError::Io(_) => ErrorKind::Io,
            StreamError::Format(_) => ErrorKind::Format,
            StreamError::NotSupported => ErrorKind::NotSupported,
            StreamError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) const DATA_LEFT: StreamError = StreamError::Io("data left in input buffer");
}

impl core::fmt::Display for StreamError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            StreamError::NoMoreData => write!(fmt, "No more data"),
            StreamError::Retry => write!(fmt, "Partial transfer, retry"),
            StreamError::Io(reason) => write!(fmt, "I/O error: {}", reason),
            StreamError::Format(reason) => write!(fmt, "Format error: {}", reason),
            StreamError::NotSupported => write!(fmt, "Operation not supported"),
            StreamError::InvalidArgument(reason) => write!(fmt, "Invalid argument: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StreamError {}
