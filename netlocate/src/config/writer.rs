//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::defaults::{DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_MIN_INTERVAL_MS};
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[sources]
; Signal sources used for position lookups. Changes are picked up by a
; running session on its next lookup.
; Look up nearby Wi-Fi access points (needs at least two)
use_wifi = {}
; Look up serving and neighbouring cells
use_cells = {}

[lookup]
; Lookup service endpoints. The encoded observations are appended as the
; `search` query parameter.
wifi_url = {}
cell_url = {}
; Minimum time between the end of one lookup and the start of the next
; (default: {})
min_interval_ms = {}
; HTTP timeout in seconds (default: {})
timeout = {}

[logging]
; Directory for the log file (default: logs, relative to the working directory)
directory = {}
; Log file name, cleared at the start of every session
file = {}
"#,
        config.sources.use_wifi,
        config.sources.use_cells,
        config.lookup.wifi_url,
        config.lookup.cell_url,
        DEFAULT_MIN_INTERVAL_MS,
        config.lookup.min_interval_ms,
        DEFAULT_LOOKUP_TIMEOUT_SECS,
        config.lookup.timeout,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
