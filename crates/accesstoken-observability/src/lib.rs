//! # Accesstoken Observability
//!
//! Console logging setup for the access token binaries.
//!
//! This crate provides:
//!
//! - [`logging`]: [`init_logging`] and the [`LogFormat`] switch
//!
//! Library crates only emit `tracing` events; a binary decides where they go by
//! calling [`init_logging`] once at startup.
//!
//! # Examples
//!
//! ```no_run
//! use accesstoken_observability::init_logging;
//!
//! fn main() {
//!     init_logging();
//!     tracing::info!("ready");
//! }
//! ```

pub mod logging;

// Re-export commonly used types at crate root
pub use logging::{LogFormat, init_logging};
