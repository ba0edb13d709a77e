// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;
use std::io;

/// Result type for HSQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for HSQ compression/decompression
///
/// Any error aborts the whole file; partially produced output is never valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A size does not fit in its header field
    InputTooLarge,

    /// Header checksum mismatch, or a header describing an impossible file
    CorruptHeader,

    /// The compressed data ends before the end-of-stream sentinel, or its
    /// tokens produce more or fewer bytes than the header declares
    TruncatedStream,

    /// A back-reference with an offset or length outside the legal ranges
    InvalidBackReference,

    /// Reading from the source or writing to the sink failed
    IoFailure(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputTooLarge => write!(f, "hsq: input too large"),
            Error::CorruptHeader => write!(f, "hsq: corrupt header"),
            Error::TruncatedStream => write!(f, "hsq: truncated stream"),
            Error::InvalidBackReference => write!(f, "hsq: invalid back-reference"),
            Error::IoFailure(msg) => write!(f, "hsq: i/o failure: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoFailure(err.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::IoFailure(msg) => io::Error::new(io::ErrorKind::Other, msg),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
