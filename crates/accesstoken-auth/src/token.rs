//! Building, parsing and verifying access tokens.
//!
//! # Token Structure
//!
//! ```text
//! "007" base64( zlib( signature | signing_info ) )
//!
//! signing_info = app_id | issue_ts | expire | salt | service_count | services...
//! ```
//!
//! Strings are `u16` length-prefixed, integers little-endian, services sorted
//! by ascending type. The signature is an HMAC-SHA256 of `signing_info` under
//! a key derived from the app certificate, the issue timestamp and the salt:
//!
//! ```text
//! k1  = HMAC-SHA256(key = issue_ts, msg = app_certificate)
//! key = HMAC-SHA256(key = salt,     msg = k1)
//! ```
//!
//! so every token is signed with a fresh key even within the same second.
//!
//! `expire` is a lifetime in seconds counted from `issue_ts`, not an absolute
//! timestamp. The same holds for privilege expiries, where `0` means "as long
//! as the token".
//!
//! # Example
//!
//! ```
//! use accesstoken_auth::privileges::rtc;
//! use accesstoken_auth::{AccessToken, Service, ServiceRtc};
//!
//! let mut token = AccessToken::new(
//!     "970ca35de60c44645bbae8a215061b33",
//!     "5cfd2fd1755d40ecb72977518be15d3b",
//!     3600,
//! );
//! token.add_service(Service::from(ServiceRtc::new("room1", 42)).with_privilege(rtc::JOIN_CHANNEL, 0));
//!
//! let built = token.build().unwrap();
//! assert!(built.starts_with("007"));
//!
//! let parsed = AccessToken::parse(&built).unwrap();
//! assert_eq!(parsed.rtc().unwrap().channel_name, "room1");
//! parsed.verify("5cfd2fd1755d40ecb72977518be15d3b").unwrap();
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};
use std::ops::RangeInclusive;

use accesstoken_core::CodecError;
use accesstoken_core::codec::{
    pack_string, pack_uint16, pack_uint32, unpack_string, unpack_uint16, unpack_uint32,
    unpack_utf8,
};
use chrono::Utc;
use data_encoding::BASE64;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Serialize, Serializer};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::errors::{BuildError, ParseError, VerifyError};
use crate::service::{Service, ServiceRtc};

/// Wire tag of this token generation.
pub const VERSION: &str = "007";

const CREDENTIAL_LENGTH: usize = 32;
const SALT_RANGE: RangeInclusive<u32> = 1..=99_999_999;

/// Upper bound on the inflated payload. Real tokens are a few hundred bytes.
const MAX_PAYLOAD_LEN: u64 = 64 * 1024;

type HmacSha256 = Hmac<Sha256>;

/// Whether `value` is a well formed app id or certificate: 32 hex characters.
pub fn is_valid_credential(value: &str) -> bool {
    value.len() == CREDENTIAL_LENGTH && hex::decode(value).is_ok()
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

fn signing_key(app_certificate: &str, issue_ts: u32, salt: u32) -> [u8; 32] {
    let key = hmac_sha256(&issue_ts.to_le_bytes(), app_certificate.as_bytes());
    hmac_sha256(&salt.to_le_bytes(), &key)
}

fn now() -> u32 {
    u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX)
}

fn random_salt() -> u32 {
    rand::thread_rng().gen_range(SALT_RANGE)
}

fn deflate(payload: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    encoder.finish()
}

/// A token under construction.
///
/// Holds the credentials and services; [`AccessToken::build`] turns them into
/// the wire string without modifying `self`.
#[derive(Clone)]
pub struct AccessToken {
    app_id: String,
    app_certificate: String,
    issue_ts: u32,
    expire: u32,
    salt: Option<u32>,
    services: BTreeMap<u16, Service>,
}

impl AccessToken {
    /// Creates an empty token. `expire` is in seconds from the issue time.
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>, expire: u32) -> Self {
        Self {
            app_id: app_id.into(),
            app_certificate: app_certificate.into(),
            issue_ts: 0,
            expire,
            salt: None,
            services: BTreeMap::new(),
        }
    }

    /// Pins the issue timestamp. `0` means "now, at build time".
    #[must_use]
    pub fn with_issue_ts(mut self, issue_ts: u32) -> Self {
        self.issue_ts = issue_ts;
        self
    }

    /// Pins the salt instead of drawing a fresh one per build.
    ///
    /// Only useful for reproducible output; reusing a salt across tokens
    /// reuses their signing key.
    #[must_use]
    pub fn with_salt(mut self, salt: u32) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Attaches a service, replacing any service of the same type.
    pub fn add_service(&mut self, service: impl Into<Service>) {
        let service = service.into();
        self.services.insert(service.service_type(), service);
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<Service>) -> Self {
        self.add_service(service);
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn expire(&self) -> u32 {
        self.expire
    }

    /// Services in ascending type order.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    fn check(&self) -> Result<(), BuildError> {
        if !is_valid_credential(&self.app_id) {
            return Err(BuildError::InvalidAppId);
        }
        if !is_valid_credential(&self.app_certificate) {
            return Err(BuildError::InvalidAppCertificate);
        }
        if self.services.is_empty() {
            return Err(BuildError::NoServices);
        }
        Ok(())
    }

    /// The bytes covered by the signature for the given timestamp and salt.
    ///
    /// Depends only on the logical content of the token: the same fields and
    /// services give the same bytes whatever order they were added in.
    pub fn signing_info(&self, issue_ts: u32, salt: u32) -> Result<Vec<u8>, CodecError> {
        let service_count = u16::try_from(self.services.len()).map_err(|_| {
            CodecError::LengthOverflow {
                len: self.services.len(),
            }
        })?;

        let mut out = Vec::new();
        pack_string(&mut out, self.app_id.as_bytes())?;
        pack_uint32(&mut out, issue_ts);
        pack_uint32(&mut out, self.expire);
        pack_uint32(&mut out, salt);
        pack_uint16(&mut out, service_count);
        for service in self.services.values() {
            service.pack(&mut out)?;
        }
        Ok(out)
    }

    /// Signs and encodes the token.
    ///
    /// Uses the current time if no issue timestamp was pinned and a fresh
    /// random salt if none was pinned.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InvalidAppId`] / [`BuildError::InvalidAppCertificate`] if a
    ///   credential is not 32 hex characters
    /// - [`BuildError::NoServices`] if no service was added
    /// - [`BuildError::Encode`] if a field is too long for its length prefix
    #[instrument(skip_all, fields(app_id = %self.app_id, services = self.services.len()))]
    pub fn build(&self) -> Result<String, BuildError> {
        if let Err(err) = self.check() {
            debug!(reason = %err, "Token build rejected");
            return Err(err);
        }

        let issue_ts = if self.issue_ts == 0 {
            now()
        } else {
            self.issue_ts
        };
        let salt = self.salt.unwrap_or_else(random_salt);

        let signing_info = self.signing_info(issue_ts, salt)?;
        let key = signing_key(&self.app_certificate, issue_ts, salt);
        let signature = hmac_sha256(&key, &signing_info);

        let mut payload = Vec::with_capacity(2 + signature.len() + signing_info.len());
        pack_string(&mut payload, &signature)?;
        payload.extend_from_slice(&signing_info);

        let compressed = deflate(&payload)?;
        debug!(issue_ts, expire = self.expire, "Token built");

        Ok(format!("{VERSION}{}", BASE64.encode(&compressed)))
    }

    /// Decodes a token string. The signature is extracted but not checked;
    /// call [`ParsedToken::verify`] for that.
    ///
    /// # Errors
    ///
    /// - [`ParseError::UnsupportedVersion`] if the token does not start with [`VERSION`]
    /// - [`ParseError::Malformed`] for any decoding failure after the version tag
    #[instrument(skip_all, fields(len = token.len()))]
    pub fn parse(token: &str) -> Result<ParsedToken, ParseError> {
        let Some(body) = token.strip_prefix(VERSION) else {
            let found: String = token.chars().take(VERSION.len()).collect();
            debug!(found = %found, "Token version rejected");
            return Err(ParseError::UnsupportedVersion {
                expected: VERSION,
                found,
            });
        };

        ParsedToken::decode(body).map_err(|cause| {
            debug!(error = %cause, "Token parse failed");
            ParseError::Malformed
        })
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .field("issue_ts", &self.issue_ts)
            .field("expire", &self.expire)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

/// Why a token body failed to decode. Logged, never returned.
#[derive(Debug, Error)]
enum DecodeError {
    #[error("base64: {0}")]
    Base64(#[from] data_encoding::DecodeError),

    #[error("inflate: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("inflated payload exceeds {} bytes", MAX_PAYLOAD_LEN)]
    TooLarge,

    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn serialize_hex<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

/// The decoded content of a token string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedToken {
    #[serde(serialize_with = "serialize_hex")]
    pub signature: Vec<u8>,
    pub app_id: String,
    pub issue_ts: u32,
    pub expire: u32,
    pub salt: u32,
    pub services: BTreeMap<u16, Service>,
    /// The exact bytes the signature was computed over.
    #[serde(skip)]
    signing_info: Vec<u8>,
}

impl ParsedToken {
    fn decode(body: &str) -> Result<Self, DecodeError> {
        let compressed = BASE64.decode(body.as_bytes())?;

        let mut payload = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .take(MAX_PAYLOAD_LEN + 1)
            .read_to_end(&mut payload)?;
        if payload.len() as u64 > MAX_PAYLOAD_LEN {
            return Err(DecodeError::TooLarge);
        }

        let (signature, signing_info) = unpack_string(&payload)?;
        let (app_id, buf) = unpack_utf8(signing_info)?;
        let (issue_ts, buf) = unpack_uint32(buf)?;
        let (expire, buf) = unpack_uint32(buf)?;
        let (salt, buf) = unpack_uint32(buf)?;
        let (service_count, mut buf) = unpack_uint16(buf)?;

        let mut services = BTreeMap::new();
        for _ in 0..service_count {
            let (service, rest) = Service::unpack(buf)?;
            services.insert(service.service_type(), service);
            buf = rest;
        }
        if !buf.is_empty() {
            return Err(CodecError::TrailingBytes(buf.len()).into());
        }

        Ok(Self {
            signature: signature.to_vec(),
            app_id,
            issue_ts,
            expire,
            salt,
            services,
            signing_info: signing_info.to_vec(),
        })
    }

    pub fn service(&self, service_type: u16) -> Option<&Service> {
        self.services.get(&service_type)
    }

    pub fn rtc(&self) -> Option<&ServiceRtc> {
        self.service(ServiceRtc::SERVICE_TYPE)
            .and_then(Service::as_rtc)
    }

    /// Absolute expiry of the token in seconds since the epoch.
    pub fn expires_at(&self) -> u64 {
        u64::from(self.issue_ts) + u64::from(self.expire)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at()
    }

    /// Absolute expiry of one privilege, or `None` if the token does not grant it.
    ///
    /// A privilege expiry of `0` follows the token's own expiry.
    pub fn privilege_expires_at(&self, service_type: u16, privilege: u16) -> Option<u64> {
        let expire = self.service(service_type)?.privileges().get(privilege)?;
        if expire == 0 {
            Some(self.expires_at())
        } else {
            Some(u64::from(self.issue_ts) + u64::from(expire))
        }
    }

    /// Checks the signature against `app_certificate` in constant time.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::InvalidAppCertificate`] if the certificate is not 32 hex characters
    /// - [`VerifyError::SignatureMismatch`] if the token was not signed with it
    #[instrument(skip_all, fields(app_id = %self.app_id))]
    pub fn verify(&self, app_certificate: &str) -> Result<(), VerifyError> {
        if !is_valid_credential(app_certificate) {
            return Err(VerifyError::InvalidAppCertificate);
        }

        let key = signing_key(app_certificate, self.issue_ts, self.salt);
        let mut mac = HmacSha256::new_from_slice(&key).expect("HMAC can take key of any size");
        mac.update(&self.signing_info);
        mac.verify_slice(&self.signature).map_err(|_| {
            debug!("Token signature mismatch");
            VerifyError::SignatureMismatch
        })
    }
}
