//! Default values for all configuration settings.
//!
//! Contains the `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation. Engine-level defaults are taken from the engine itself so
//! the file and the library cannot disagree.

use super::settings::*;
use crate::arbiter::DEFAULT_MIN_INTERVAL;
use crate::logging::{default_log_dir, default_log_file};
use crate::lookup::{DEFAULT_CELL_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_WIFI_URL};

/// Default minimum interval between lookups, in milliseconds.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = DEFAULT_MIN_INTERVAL.as_millis() as u64;

/// Default HTTP timeout for lookups, in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            sources: SourcesSettings {
                use_wifi: true,
                use_cells: true,
            },
            lookup: LookupSettings {
                wifi_url: DEFAULT_WIFI_URL.to_string(),
                cell_url: DEFAULT_CELL_URL.to_string(),
                min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
                timeout: DEFAULT_LOOKUP_TIMEOUT_SECS,
            },
            logging: LoggingSettings {
                directory: default_log_dir().into(),
                file: default_log_file().to_string(),
            },
        }
    }
}
