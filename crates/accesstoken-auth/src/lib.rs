//! # Accesstoken Auth
//!
//! Signed access tokens that grant scoped privileges for a bounded time,
//! verifiable without any lookup.
//!
//! This crate provides:
//!
//! - [`privileges`]: privilege ids per service and the [`PrivilegeSet`] map
//! - [`service`]: the [`Service`] kinds a token can carry
//! - [`token`]: building, parsing and verifying tokens
//! - [`errors`]: [`BuildError`], [`ParseError`] and [`VerifyError`]
//!
//! # Example
//!
//! ```ignore
//! use accesstoken_auth::{AccessToken, Service, ServiceRtc, privileges::rtc};
//!
//! // Issue
//! let token = AccessToken::new(app_id, app_certificate, 3600)
//!     .with_service(Service::from(ServiceRtc::new("room1", 42)).with_privilege(rtc::JOIN_CHANNEL, 0))
//!     .build()?;
//!
//! // Inspect, then check the signature
//! let parsed = AccessToken::parse(&token)?;
//! parsed.verify(app_certificate)?;
//! ```

pub mod errors;
pub mod privileges;
pub mod service;
pub mod token;

// Re-export commonly used types at crate root
pub use errors::{BuildError, ParseError, VerifyError};
pub use privileges::PrivilegeSet;
pub use service::{Service, ServiceRtc};
pub use token::{AccessToken, ParsedToken, VERSION, is_valid_credential};
