//! Error types for values, typed buffers and the wire codec.
//!
//! Every failure in this crate is reported as an [`Error`] and none of them are
//! fatal: callers of [`serialize`](crate::serialize),
//! [`deserialize`](crate::deserialize) and the dispatch functions receive the
//! error and decide what to do with it.
//!
//! ## Error Categories
//!
//! - **Empty handles**: [`Error::UninitializedValue`], [`Error::UninitializedBuffer`]
//! - **Type errors**: [`Error::TypeMismatch`], [`Error::UnsupportedType`],
//!   [`Error::UnsupportedComparison`]
//! - **Stream errors**: [`Error::StreamTruncated`], [`Error::MalformedBlock`],
//!   [`Error::InvalidKey`], [`Error::TrailingBytes`], [`Error::Io`]
//! - **Invariant and safety errors**: [`Error::CountMismatch`],
//!   [`Error::ResourceLimitExceeded`]
//!
//! A failed write leaves whatever was already written in the sink; treat the
//! sink as corrupted. A failed read never yields a partially built value.
//!
//! ## Examples
//!
//! ```rust
//! use polyvalue::{from_slice, Error};
//!
//! // A size prefix promising 16 bytes followed by only two.
//! let result = from_slice(&[16, 0, 0, 0, 7, 1]);
//! assert!(matches!(result, Err(Error::StreamTruncated { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// IO error while reading from a source or writing to a sink
    #[error("IO error: {0}")]
    Io(String),

    /// Operation attempted on an empty value
    #[error("cannot get the data type of an uninitialized value")]
    UninitializedValue,

    /// Operation attempted on a buffer that owns no bytes
    #[error("buffer holds no encoded block")]
    UninitializedBuffer,

    /// Typed access with a type inconsistent with the stored tag
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A tag that the codec or the dispatch layer does not handle
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A comparison pairing that has no meaning
    #[error("unsupported comparison: {0}")]
    UnsupportedComparison(String),

    /// The stream ended before a length field was satisfied
    #[error("stream truncated at offset {at}: needed {need} bytes, only {got} available")]
    StreamTruncated { at: u64, need: u64, got: u64 },

    /// A map header count disagrees with the entries present
    #[error("map header declares {declared} entries but {actual} are present")]
    CountMismatch { declared: u64, actual: u64 },

    /// A declared size, count or nesting depth exceeds a configured bound
    #[error("resource limit exceeded: {what} is {found}, limit is {limit}")]
    ResourceLimitExceeded {
        what: &'static str,
        found: u64,
        limit: u64,
    },

    /// An encoded block whose framing or payload length is inconsistent
    #[error("malformed block: {0}")]
    MalformedBlock(String),

    /// A map key that is not valid UTF-8
    #[error("map key at offset {at} is not valid UTF-8")]
    InvalidKey { at: u64 },

    /// Input left over after a complete value was read
    #[error("{count} trailing bytes after the value")]
    TrailingBytes { count: u64 },
}

impl Error {
    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use polyvalue::Error;
    ///
    /// let err = Error::type_mismatch("scalar int32", "vector float64");
    /// assert!(err.to_string().contains("expected scalar int32"));
    /// ```
    pub fn type_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(msg: impl fmt::Display) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates an unsupported comparison error.
    pub fn unsupported_comparison(msg: impl fmt::Display) -> Self {
        Error::UnsupportedComparison(msg.to_string())
    }

    /// Creates a truncation error for a read of `need` bytes at offset `at`
    /// that only produced `got`.
    pub fn truncated(at: u64, need: u64, got: u64) -> Self {
        Error::StreamTruncated { at, need, got }
    }

    /// Creates a resource limit error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use polyvalue::Error;
    ///
    /// let err = Error::limit("map entry count", 1 << 31, 1 << 20);
    /// assert!(err.to_string().contains("map entry count"));
    /// ```
    pub fn limit(what: &'static str, found: u64, limit: u64) -> Self {
        Error::ResourceLimitExceeded { what, found, limit }
    }

    /// Creates a malformed block error.
    pub fn malformed(msg: impl fmt::Display) -> Self {
        Error::MalformedBlock(msg.to_string())
    }

    /// Creates an I/O error from a sink or source failure.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors caused by hostile or corrupt input rather
    /// than by API misuse.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::StreamTruncated { .. }
                | Error::ResourceLimitExceeded { .. }
                | Error::MalformedBlock(_)
                | Error::InvalidKey { .. }
                | Error::TrailingBytes { .. }
                | Error::UnsupportedType(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
