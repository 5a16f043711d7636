//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::arbiter::{ArbiterConfig, SourceSettings};
use crate::lookup::LookupEndpoints;

/// Complete host configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Which signal sources feed the arbiter
    pub sources: SourcesSettings,
    /// Lookup service settings
    pub lookup: LookupSettings,
    /// Log file location
    pub logging: LoggingSettings,
}

/// Source toggles. Reloadable while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcesSettings {
    pub use_wifi: bool,
    pub use_cells: bool,
}

/// Lookup service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    /// Wi-Fi endpoint, without the `search` parameter
    pub wifi_url: String,
    /// Cell endpoint, without the `search` parameter
    pub cell_url: String,
    /// Minimum time between lookups in milliseconds
    pub min_interval_ms: u64,
    /// HTTP timeout in seconds
    pub timeout: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory the log file is written to
    pub directory: PathBuf,
    /// Log file name
    pub file: String,
}

impl ConfigFile {
    /// Source toggles in the form the arbiter takes.
    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings::new(self.sources.use_wifi, self.sources.use_cells)
    }

    /// Full arbiter configuration.
    pub fn arbiter_config(&self) -> ArbiterConfig {
        ArbiterConfig {
            min_interval: Duration::from_millis(self.lookup.min_interval_ms),
            endpoints: LookupEndpoints {
                wifi: self.lookup.wifi_url.clone(),
                cell: self.lookup.cell_url.clone(),
            },
            sources: self.source_settings(),
        }
    }
}
