//! Errors raised by the binary codec.

use thiserror::Error;

/// Low level field error from packing or unpacking a buffer.
///
/// These never reach callers of the token API directly; the token layer
/// logs them and folds them into its own error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("buffer too short: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("field length {len} does not fit a u16 length prefix")]
    LengthOverflow { len: usize },

    #[error("field is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown service type {0}")]
    UnknownServiceType(u16),

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}
