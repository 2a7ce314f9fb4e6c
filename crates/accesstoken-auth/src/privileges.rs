//! Privilege identifiers and the per-service privilege set.
//!
//! Privilege ids are only unique within a service type. Use the constants of
//! the submodule matching the service.
//!
//! # Example
//!
//! ```
//! use accesstoken_auth::privileges::{self, PrivilegeSet};
//!
//! let mut set = PrivilegeSet::new();
//! set.insert(privileges::rtc::PUBLISH_AUDIO_STREAM, 0);
//! set.insert(privileges::rtc::JOIN_CHANNEL, 0);
//!
//! let ids: Vec<u16> = set.iter().map(|(id, _)| id).collect();
//! assert_eq!(ids, [1, 2]);
//! ```

use std::collections::BTreeMap;

use accesstoken_core::CodecError;
use accesstoken_core::codec::{pack_map_uint32, unpack_map_uint32};
use serde::Serialize;

// =============================================================================
// RTC privileges
// =============================================================================

pub mod rtc {
    /// Join the channel
    pub const JOIN_CHANNEL: u16 = 1;
    /// Publish an audio stream
    pub const PUBLISH_AUDIO_STREAM: u16 = 2;
    /// Publish a video stream
    pub const PUBLISH_VIDEO_STREAM: u16 = 3;
    /// Publish a data stream
    pub const PUBLISH_DATA_STREAM: u16 = 4;
}

/// Privilege id to expiry, in ascending id order.
///
/// Backed by a `BTreeMap`, so iteration and serialization order depend only on
/// the ids and never on insertion order. The signature covers the serialized
/// bytes, which makes that ordering load-bearing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PrivilegeSet(BTreeMap<u16, u32>);

impl PrivilegeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `privilege` with the given expiry, replacing any previous expiry.
    pub fn insert(&mut self, privilege: u16, expire: u32) {
        self.0.insert(privilege, expire);
    }

    pub fn get(&self, privilege: u16) -> Option<u32> {
        self.0.get(&privilege).copied()
    }

    pub fn contains(&self, privilege: u16) -> bool {
        self.0.contains_key(&privilege)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.0.iter().map(|(&id, &expire)| (id, expire))
    }

    pub fn pack(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        pack_map_uint32(out, &self.0)
    }

    /// Ids are not range-checked; unknown ids are kept as read.
    pub fn unpack(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (map, rest) = unpack_map_uint32(buf)?;
        Ok((Self(map), rest))
    }
}

impl FromIterator<(u16, u32)> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = (u16, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
