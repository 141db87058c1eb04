//! Shared building blocks for the Nucleus toolkit.
//!
//! Every repository and stream crate in the workspace depends on this one for:
//! - the cancellation signal threaded through each async operation
//! - HTTP-equivalent status classification of backing-service failures
//! - JSON configuration loading
//! - tracing subscriber setup for binaries and tests

mod cancel;
pub mod config;
mod status;
pub mod telemetry;

pub use cancel::{Canceled, Cancellation};
pub use config::ConfigError;
pub use status::ServiceStatus;
