//! Configuration for the lookup arbiter.

use std::time::Duration;

use crate::lookup::LookupEndpoints;

/// Default minimum interval between dispatched lookups.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(5000);

/// Fewest access points that can resolve a position on their own.
pub const MIN_WIFI_OBSERVATIONS: usize = 2;

/// Which signal sources feed the arbiter.
///
/// Reloadable at any time; a change applies to the next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSettings {
    pub use_wifi: bool,
    pub use_cells: bool,
}

impl SourceSettings {
    pub fn new(use_wifi: bool, use_cells: bool) -> Self {
        Self {
            use_wifi,
            use_cells,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Configuration for the [`Arbiter`](super::Arbiter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbiterConfig {
    /// Minimum time between the end of one dispatch and the start of the next.
    pub min_interval: Duration,

    /// Lookup service endpoints.
    pub endpoints: LookupEndpoints,

    /// Initial source toggles.
    pub sources: SourceSettings,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            endpoints: LookupEndpoints::default(),
            sources: SourceSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArbiterConfig::default();
        assert_eq!(config.min_interval, Duration::from_secs(5));
        assert!(config.sources.use_wifi);
        assert!(config.sources.use_cells);
        assert_eq!(config.endpoints, LookupEndpoints::default());
    }
}
