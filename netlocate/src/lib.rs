//! netlocate - Network-based geolocation from Wi-Fi and cell observations
//!
//! This library collects the access points and cell towers a device can see,
//! decides when they are worth looking up, resolves them against the Mylnikov
//! geolocation service and reports a position estimate.
//!
//! # High-Level API
//!
//! The [`arbiter`] module is the entry point:
//!
//! ```ignore
//! use netlocate::arbiter::{Arbiter, ArbiterConfig};
//! use netlocate::lookup::AsyncReqwestClient;
//! use netlocate::report::ChannelReporter;
//!
//! let reporter = ChannelReporter::new();
//! let mut estimates = reporter.subscribe();
//!
//! let arbiter = Arbiter::new(AsyncReqwestClient::new()?, reporter, ArbiterConfig::default())?;
//! arbiter.start()?;
//!
//! arbiter.update_wifi(scan);
//! let estimate = estimates.recv().await?;
//! ```
//!
//! Radio scanning is the host's job; the library only sees the results.

pub mod arbiter;
pub mod config;
pub mod logging;
pub mod lookup;
pub mod report;
pub mod session;
pub mod signal;

/// Version of the netlocate library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
