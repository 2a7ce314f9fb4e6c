//! Token issuance configuration.
//!
//! # Configuration
//!
//! - `TOKEN_APP_ID`: application identifier, 32 hex characters (required)
//! - `TOKEN_APP_CERTIFICATE`: signing certificate, 32 hex characters (required)
//! - `TOKEN_EXPIRE_SECONDS`: token lifetime relative to issue time (default: 600000)
//! - `TOKEN_PRIVILEGE_EXPIRE_SECONDS`: per-privilege lifetime, 0 meaning "same as the
//!   token" (default: 0)
//!
//! The values are only validated for presence and number syntax here. Whether the
//! app id and certificate are well formed is checked when a token is built.

use std::fmt;

use thiserror::Error;

pub const APP_ID_VAR: &str = "TOKEN_APP_ID";
pub const APP_CERTIFICATE_VAR: &str = "TOKEN_APP_CERTIFICATE";
pub const EXPIRE_VAR: &str = "TOKEN_EXPIRE_SECONDS";
pub const PRIVILEGE_EXPIRE_VAR: &str = "TOKEN_PRIVILEGE_EXPIRE_SECONDS";

pub const DEFAULT_TOKEN_EXPIRE: u32 = 600_000;
pub const DEFAULT_PRIVILEGE_EXPIRE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Credentials and lifetimes used by the issuer.
///
/// Read-only once loaded; pass it by reference to whoever issues tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Application identifier embedded in every token.
    pub app_id: String,

    /// Shared signing secret. Never leaves the process.
    pub app_certificate: String,

    /// Token lifetime in seconds, counted from the issue timestamp.
    pub token_expire: u32,

    /// Privilege lifetime in seconds; 0 means the privilege lives as long as the token.
    pub privilege_expire: u32,
}

impl TokenConfig {
    /// Creates a config with the default lifetimes.
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_certificate: app_certificate.into(),
            token_expire: DEFAULT_TOKEN_EXPIRE,
            privilege_expire: DEFAULT_PRIVILEGE_EXPIRE,
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the app id or certificate is unset, and
    /// [`ConfigError::Invalid`] if a lifetime is not a valid `u32`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let seconds = |var: &'static str, default: u32| match lookup(var) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value }),
        };

        Ok(Self {
            app_id: required(APP_ID_VAR)?,
            app_certificate: required(APP_CERTIFICATE_VAR)?,
            token_expire: seconds(EXPIRE_VAR, DEFAULT_TOKEN_EXPIRE)?,
            privilege_expire: seconds(PRIVILEGE_EXPIRE_VAR, DEFAULT_PRIVILEGE_EXPIRE)?,
        })
    }

    #[must_use]
    pub fn with_token_expire(mut self, seconds: u32) -> Self {
        self.token_expire = seconds;
        self
    }

    #[must_use]
    pub fn with_privilege_expire(mut self, seconds: u32) -> Self {
        self.privilege_expire = seconds;
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .field("token_expire", &self.token_expire)
            .field("privilege_expire", &self.privilege_expire)
            .finish()
    }
}
