//! # Accesstoken Core
//!
//! Low level building blocks shared by the access token crates.
//!
//! This crate provides:
//!
//! - [`codec`]: little-endian pack/unpack primitives for the token wire format
//! - [`errors`]: the [`CodecError`] raised by those primitives
//!
//! # Example
//!
//! ```
//! use accesstoken_core::codec::{pack_string, pack_uint32, unpack_string, unpack_uint32};
//!
//! let mut buf = Vec::new();
//! pack_string(&mut buf, b"room1").unwrap();
//! pack_uint32(&mut buf, 600);
//!
//! let (channel, rest) = unpack_string(&buf).unwrap();
//! let (expire, rest) = unpack_uint32(rest).unwrap();
//! assert_eq!(channel, b"room1");
//! assert_eq!(expire, 600);
//! assert!(rest.is_empty());
//! ```

pub mod codec;
pub mod errors;

// Re-export commonly used types at crate root
pub use errors::CodecError;
