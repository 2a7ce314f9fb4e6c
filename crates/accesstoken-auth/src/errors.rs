//! Errors returned by the token API.
//!
//! Build and verify errors say exactly what is wrong. Parse errors only
//! distinguish "wrong generation" from "malformed": the decoding cause is
//! logged at `debug` level and never returned to the caller.

use accesstoken_core::CodecError;
use thiserror::Error;

/// The token could not be built. No partial output exists.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("app id must be 32 hex characters")]
    InvalidAppId,

    #[error("app certificate must be 32 hex characters")]
    InvalidAppCertificate,

    #[error("token has no services")]
    NoServices,

    #[error("token field cannot be encoded: {0}")]
    Encode(#[from] CodecError),

    #[error("token payload compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported token version {found:?}, expected {expected:?}")]
    UnsupportedVersion {
        expected: &'static str,
        found: String,
    },

    #[error("malformed token")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("app certificate must be 32 hex characters")]
    InvalidAppCertificate,

    #[error("token signature does not match")]
    SignatureMismatch,
}
