//! Token issuance on top of a [`TokenConfig`].
//!
//! The issuer owns the application credentials and turns "this user may do
//! these things in this channel" into a token string. It is the only place
//! that touches the certificate, so callers never handle the secret.
//!
//! # Example
//!
//! ```ignore
//! use accesstoken::issuer::{Issuer, Role};
//! use accesstoken_config::TokenConfig;
//!
//! let issuer = Issuer::new(TokenConfig::from_env()?);
//! let token = issuer.issue_with_role("room1", 42, Role::Publisher)?;
//! let parsed = issuer.check(&token.token, now)?;
//! ```

use std::fmt;
use std::str::FromStr;

use accesstoken_auth::privileges::rtc;
use accesstoken_auth::{
    AccessToken, BuildError, ParseError, ParsedToken, Service, ServiceRtc, VerifyError,
};
use accesstoken_config::TokenConfig;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Canned RTC privilege sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Join and publish audio, video and data.
    #[default]
    Publisher,
    /// Join only.
    Subscriber,
}

impl Role {
    pub fn privileges(self) -> &'static [u16] {
        match self {
            Role::Publisher => &[
                rtc::JOIN_CHANNEL,
                rtc::PUBLISH_AUDIO_STREAM,
                rtc::PUBLISH_VIDEO_STREAM,
                rtc::PUBLISH_DATA_STREAM,
            ],
            Role::Subscriber => &[rtc::JOIN_CHANNEL],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => write!(f, "publisher"),
            Role::Subscriber => write!(f, "subscriber"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "publisher" => Ok(Role::Publisher),
            "subscriber" => Ok(Role::Subscriber),
            other => Err(format!("unknown role {other:?}, expected publisher or subscriber")),
        }
    }
}

/// An issued token together with the uid it was scoped to (`0` = any user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub uid: String,
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Signature(#[from] VerifyError),

    #[error("token was issued for app {0}")]
    AppIdMismatch(String),

    #[error("token expired at {0}")]
    Expired(u64),
}

#[derive(Debug, Clone)]
pub struct Issuer {
    config: TokenConfig,
}

impl Issuer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    fn build(&self, service: ServiceRtc, privileges: &[u16], expire: u32) -> Result<String, BuildError> {
        let mut service = Service::from(service);
        for &privilege in privileges {
            service.add_privilege(privilege, self.config.privilege_expire);
        }

        AccessToken::new(&self.config.app_id, &self.config.app_certificate, expire)
            .with_service(service)
            .build()
    }

    /// Issues an RTC token for `channel`.
    ///
    /// `uid` 0 admits any user. Each privilege gets the configured privilege
    /// lifetime; `expire` is the token lifetime in seconds.
    #[instrument(skip(self, privileges))]
    pub fn issue(
        &self,
        channel: &str,
        uid: u32,
        privileges: &[u16],
        expire: u32,
    ) -> Result<IssuedToken, BuildError> {
        let token = self
            .build(ServiceRtc::new(channel, uid), privileges, expire)
            .inspect_err(|e| warn!(error = %e, "Token issuance failed"))?;
        info!(privileges = privileges.len(), "Token issued");

        Ok(IssuedToken {
            token,
            uid: uid.to_string(),
        })
    }

    /// Issues an RTC token for a string user account instead of a numeric uid.
    #[instrument(skip(self, privileges))]
    pub fn issue_for_account(
        &self,
        channel: &str,
        account: &str,
        privileges: &[u16],
        expire: u32,
    ) -> Result<IssuedToken, BuildError> {
        let token = self
            .build(ServiceRtc::with_account(channel, account), privileges, expire)
            .inspect_err(|e| warn!(error = %e, "Token issuance failed"))?;
        info!(privileges = privileges.len(), "Token issued");

        Ok(IssuedToken {
            token,
            uid: account.to_string(),
        })
    }

    /// Issues a token with the privileges of `role` and the configured lifetime.
    pub fn issue_with_role(&self, channel: &str, uid: u32, role: Role) -> Result<IssuedToken, BuildError> {
        self.issue(channel, uid, role.privileges(), self.config.token_expire)
    }

    /// Decodes a token without checking it.
    pub fn parse(&self, token: &str) -> Result<ParsedToken, ParseError> {
        AccessToken::parse(token)
    }

    /// Decodes a token and accepts it only if it was signed with this issuer's
    /// certificate, for this app, and has not expired at `now` (seconds since epoch).
    #[instrument(skip_all)]
    pub fn check(&self, token: &str, now: u64) -> Result<ParsedToken, CheckError> {
        let parsed = AccessToken::parse(token)?;
        if parsed.app_id != self.config.app_id {
            return Err(CheckError::AppIdMismatch(parsed.app_id));
        }
        parsed.verify(&self.config.app_certificate)?;
        if parsed.is_expired(now) {
            return Err(CheckError::Expired(parsed.expires_at()));
        }
        Ok(parsed)
    }
}
