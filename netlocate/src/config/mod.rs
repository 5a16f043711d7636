//! Host configuration.
//!
//! The engine itself is configured with plain structs
//! ([`ArbiterConfig`](crate::arbiter::ArbiterConfig),
//! [`SourceSettings`](crate::arbiter::SourceSettings)). This module adds the
//! user-facing INI file a host loads them from.
//!
//! # Example
//!
//! ```no_run
//! use netlocate::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let arbiter_config = config.arbiter_config();
//! # Ok::<(), netlocate::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_MIN_INTERVAL_MS};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, LoggingSettings, LookupSettings, SourcesSettings};
