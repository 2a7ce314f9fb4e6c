//! Services carried by an access token.
//!
//! A service is a type tag, a [`PrivilegeSet`] and a few fields specific to
//! that kind of service. On the wire each service is:
//!
//! ```text
//! service_type u16 | privileges (u16 count, {u16 id, u32 expire}*) | variant fields
//! ```
//!
//! Only RTC (type 1, fields: channel name, uid) is implemented. Any other
//! type tag is rejected when parsing.

use accesstoken_core::CodecError;
use accesstoken_core::codec::{pack_string, pack_uint16, unpack_uint16, unpack_utf8};
use serde::Serialize;

use crate::privileges::PrivilegeSet;

/// Real-time communication: access to one media channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceRtc {
    pub privileges: PrivilegeSet,
    pub channel_name: String,
    /// Decimal uid, user account, or empty for "any user".
    pub uid: String,
}

impl ServiceRtc {
    pub const SERVICE_TYPE: u16 = 1;

    /// Scopes the service to a numeric uid. A uid of `0` lets any user join.
    pub fn new(channel_name: impl Into<String>, uid: u32) -> Self {
        Self {
            privileges: PrivilegeSet::new(),
            channel_name: channel_name.into(),
            uid: if uid == 0 {
                String::new()
            } else {
                uid.to_string()
            },
        }
    }

    /// Scopes the service to a string user account.
    pub fn with_account(channel_name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            privileges: PrivilegeSet::new(),
            channel_name: channel_name.into(),
            uid: account.into(),
        }
    }

    /// The numeric uid, `Some(0)` for the wildcard and `None` for a user account.
    pub fn numeric_uid(&self) -> Option<u32> {
        if self.uid.is_empty() {
            Some(0)
        } else {
            self.uid.parse().ok()
        }
    }

    fn pack_fields(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        pack_string(out, self.channel_name.as_bytes())?;
        pack_string(out, self.uid.as_bytes())
    }

    fn unpack_body(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (privileges, buf) = PrivilegeSet::unpack(buf)?;
        let (channel_name, buf) = unpack_utf8(buf)?;
        let (uid, buf) = unpack_utf8(buf)?;
        Ok((
            Self {
                privileges,
                channel_name,
                uid,
            },
            buf,
        ))
    }
}

/// Every service kind this crate can build and parse.
///
/// Parsing refuses any tag without a variant here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "service", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Service {
    Rtc(ServiceRtc),
}

impl Service {
    pub fn service_type(&self) -> u16 {
        match self {
            Service::Rtc(_) => ServiceRtc::SERVICE_TYPE,
        }
    }

    pub fn privileges(&self) -> &PrivilegeSet {
        match self {
            Service::Rtc(s) => &s.privileges,
        }
    }

    pub fn privileges_mut(&mut self) -> &mut PrivilegeSet {
        match self {
            Service::Rtc(s) => &mut s.privileges,
        }
    }

    /// Grants `privilege` with a lifetime of `expire` seconds (0 = same as the token).
    pub fn add_privilege(&mut self, privilege: u16, expire: u32) {
        self.privileges_mut().insert(privilege, expire);
    }

    /// Builder form of [`Service::add_privilege`].
    #[must_use]
    pub fn with_privilege(mut self, privilege: u16, expire: u32) -> Self {
        self.add_privilege(privilege, expire);
        self
    }

    pub fn as_rtc(&self) -> Option<&ServiceRtc> {
        match self {
            Service::Rtc(s) => Some(s),
        }
    }

    /// Writes the type tag, the privileges and the variant fields.
    pub fn pack(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        pack_uint16(out, self.service_type());
        self.privileges().pack(out)?;
        match self {
            Service::Rtc(s) => s.pack_fields(out),
        }
    }

    /// Reads one service, dispatching on its type tag, and returns the unread rest.
    ///
    /// # Errors
    ///
    /// [`CodecError::UnknownServiceType`] for a tag no variant claims, or any
    /// field error from the codec.
    pub fn unpack(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (service_type, buf) = unpack_uint16(buf)?;
        match service_type {
            ServiceRtc::SERVICE_TYPE => {
                ServiceRtc::unpack_body(buf).map(|(s, rest)| (Service::Rtc(s), rest))
            }
            other => Err(CodecError::UnknownServiceType(other)),
        }
    }
}

impl From<ServiceRtc> for Service {
    fn from(service: ServiceRtc) -> Self {
        Service::Rtc(service)
    }
}
