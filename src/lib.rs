//! # Accesstoken
//!
//! Issues and inspects signed channel access tokens.
//!
//! The protocol itself lives in the workspace crates; this crate adds the
//! [`issuer`] that binds it to a loaded configuration, and the `accesstoken`
//! command-line tool.

pub mod issuer;

pub use accesstoken_auth as auth;
pub use accesstoken_config::TokenConfig;
pub use issuer::{CheckError, IssuedToken, Issuer, Role};
