//! Observation value types.
//!
//! Observations are immutable values handed to the engine by the platform
//! scanning subsystem. Each type knows its own identity so the
//! [`SignalStore`](super::SignalStore) can keep sets unique.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tokio::time::Instant;

/// One visible Wi-Fi access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiObservation {
    bssid: String,
    signal: i32,
}

impl WifiObservation {
    /// Create an observation from a BSSID in string form and an RSSI in dBm.
    ///
    /// The BSSID is normalised to lowercase so that the same access point
    /// reported with different casing has one identity.
    pub fn new(bssid: impl AsRef<str>, signal: i32) -> Self {
        Self {
            bssid: bssid.as_ref().trim().to_ascii_lowercase(),
            signal,
        }
    }

    /// Hardware identifier of the access point.
    pub fn bssid(&self) -> &str {
        &self.bssid
    }

    /// Received signal strength in dBm.
    pub fn signal(&self) -> i32 {
        self.signal
    }
}

/// Radio access technology of a cell tower.
///
/// This is a closed set. Callers that cannot classify a radio should use
/// [`RadioType::default()`], which is [`RadioType::Gsm`]; no other implicit
/// fallback exists anywhere in the crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RadioType {
    #[default]
    Gsm,
    Umts,
    Lte,
    Cdma,
}

impl RadioType {
    /// Name used by geolocation services for this radio type.
    pub fn name(self) -> &'static str {
        match self {
            RadioType::Gsm => "gsm",
            RadioType::Umts => "wcdma",
            RadioType::Lte => "lte",
            RadioType::Cdma => "cdma",
        }
    }
}

impl fmt::Display for RadioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a radio type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown radio type '{0}' (expected gsm, umts, wcdma, lte or cdma)")]
pub struct RadioTypeParseError(pub String);

impl FromStr for RadioType {
    type Err = RadioTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gsm" => Ok(RadioType::Gsm),
            "umts" | "wcdma" => Ok(RadioType::Umts),
            "lte" => Ok(RadioType::Lte),
            "cdma" => Ok(RadioType::Cdma),
            _ => Err(RadioTypeParseError(s.to_string())),
        }
    }
}

/// Identity of a cell tower within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIdentity {
    pub radio: RadioType,
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u32,
    pub cid: u64,
}

/// One visible cell tower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellObservation {
    identity: CellIdentity,
    signal: i32,
}

impl CellObservation {
    /// Create an observation.
    ///
    /// # Arguments
    ///
    /// * `radio` - Radio access technology
    /// * `mcc` - Mobile country code
    /// * `mnc` - Mobile network code
    /// * `lac` - Location area code (TAC for LTE)
    /// * `cid` - Cell id
    /// * `signal` - Raw signal strength in dBm
    pub fn new(radio: RadioType, mcc: u16, mnc: u16, lac: u32, cid: u64, signal: i32) -> Self {
        Self {
            identity: CellIdentity {
                radio,
                mcc,
                mnc,
                lac,
                cid,
            },
            signal,
        }
    }

    pub fn identity(&self) -> CellIdentity {
        self.identity
    }

    pub fn radio(&self) -> RadioType {
        self.identity.radio
    }

    pub fn mcc(&self) -> u16 {
        self.identity.mcc
    }

    pub fn mnc(&self) -> u16 {
        self.identity.mnc
    }

    pub fn lac(&self) -> u32 {
        self.identity.lac
    }

    pub fn cid(&self) -> u64 {
        self.identity.cid
    }

    /// Raw signal strength in dBm.
    pub fn signal(&self) -> i32 {
        self.signal
    }
}

/// The latest known radio environment.
///
/// Both halves are keyed by observation identity, which keeps them unique and
/// gives a stable iteration order for request encoding.
#[derive(Debug, Clone)]
pub struct SignalSnapshot {
    pub(super) wifis: BTreeMap<String, WifiObservation>,
    pub(super) cells: BTreeMap<CellIdentity, CellObservation>,
    pub(super) captured_at: Instant,
}

impl SignalSnapshot {
    /// An empty snapshot captured now.
    pub fn empty() -> Self {
        Self {
            wifis: BTreeMap::new(),
            cells: BTreeMap::new(),
            captured_at: Instant::now(),
        }
    }

    /// Visible access points in stable order.
    pub fn wifis(&self) -> impl Iterator<Item = &WifiObservation> {
        self.wifis.values()
    }

    /// Visible cell towers in stable order.
    pub fn cells(&self) -> impl Iterator<Item = &CellObservation> {
        self.cells.values()
    }

    pub fn wifi_count(&self) -> usize {
        self.wifis.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wifis.is_empty() && self.cells.is_empty()
    }

    /// Monotonic time of the most recent update to either half.
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}

impl Default for SignalSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
