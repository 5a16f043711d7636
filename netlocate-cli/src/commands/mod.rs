//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, show, path)
//! - [`locate`] - One-shot lookup from command-line observations
//! - [`watch`] - Long-running session fed from a scan stream

pub mod common;
pub mod config;
pub mod locate;
pub mod watch;
