//! Little-endian pack/unpack primitives.
//!
//! Every `pack_*` function appends to an output buffer. Every `unpack_*`
//! function reads a prefix of its input and returns the decoded value
//! together with the unread remainder, so fields can be chained:
//!
//! ```
//! use accesstoken_core::codec::{pack_uint16, unpack_uint16};
//!
//! let mut buf = Vec::new();
//! pack_uint16(&mut buf, 1);
//! pack_uint16(&mut buf, 2);
//!
//! let (a, rest) = unpack_uint16(&buf).unwrap();
//! let (b, rest) = unpack_uint16(rest).unwrap();
//! assert_eq!((a, b), (1, 2));
//! assert!(rest.is_empty());
//! ```
//!
//! Strings are length-prefixed with a `u16`, maps with a `u16` entry count.

use std::collections::BTreeMap;

use crate::CodecError;

fn take<const N: usize>(buf: &[u8]) -> Result<(&[u8; N], &[u8]), CodecError> {
    buf.split_first_chunk::<N>().ok_or(CodecError::Truncated {
        needed: N,
        remaining: buf.len(),
    })
}

fn prefix_len(len: usize) -> Result<u16, CodecError> {
    u16::try_from(len).map_err(|_| CodecError::LengthOverflow { len })
}

pub fn pack_uint16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn unpack_uint16(buf: &[u8]) -> Result<(u16, &[u8]), CodecError> {
    let (bytes, rest) = take::<2>(buf)?;
    Ok((u16::from_le_bytes(*bytes), rest))
}

pub fn pack_uint32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn unpack_uint32(buf: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    let (bytes, rest) = take::<4>(buf)?;
    Ok((u32::from_le_bytes(*bytes), rest))
}

/// Appends `value` with a `u16` length prefix.
pub fn pack_string(out: &mut Vec<u8>, value: &[u8]) -> Result<(), CodecError> {
    pack_uint16(out, prefix_len(value.len())?);
    out.extend_from_slice(value);
    Ok(())
}

pub fn unpack_string(buf: &[u8]) -> Result<(&[u8], &[u8]), CodecError> {
    let (len, rest) = unpack_uint16(buf)?;
    let len = usize::from(len);
    if rest.len() < len {
        return Err(CodecError::Truncated {
            needed: len,
            remaining: rest.len(),
        });
    }
    Ok(rest.split_at(len))
}

/// Like [`unpack_string`], but requires the bytes to be UTF-8.
pub fn unpack_utf8(buf: &[u8]) -> Result<(String, &[u8]), CodecError> {
    let (bytes, rest) = unpack_string(buf)?;
    let value = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
    Ok((value.to_owned(), rest))
}

/// Appends a `u16` entry count followed by `(u16 key, u32 value)` pairs in
/// ascending key order.
pub fn pack_map_uint32(out: &mut Vec<u8>, map: &BTreeMap<u16, u32>) -> Result<(), CodecError> {
    pack_uint16(out, prefix_len(map.len())?);
    for (&key, &value) in map {
        pack_uint16(out, key);
        pack_uint32(out, value);
    }
    Ok(())
}

/// Decodes a map written by [`pack_map_uint32`]. A repeated key keeps the
/// last value read.
pub fn unpack_map_uint32(buf: &[u8]) -> Result<(BTreeMap<u16, u32>, &[u8]), CodecError> {
    let (count, mut rest) = unpack_uint16(buf)?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let (key, next) = unpack_uint16(rest)?;
        let (value, next) = unpack_uint32(next)?;
        map.insert(key, value);
        rest = next;
    }
    Ok((map, rest))
}
