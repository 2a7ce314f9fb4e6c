//! # Accesstoken Config
//!
//! Configuration types for access token issuance.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`token`]: application credentials and default token lifetimes
//!
//! # Example
//!
//! ```ignore
//! use accesstoken_config::TokenConfig;
//!
//! let config = TokenConfig::from_env()?;
//! println!("issuing for app {}", config.app_id);
//! ```

pub mod token;

// Re-export commonly used types at crate root
pub use token::{ConfigError, TokenConfig};
