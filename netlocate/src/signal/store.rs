//! Holder for the current radio environment.

use tokio::time::Instant;

use super::types::{CellObservation, SignalSnapshot, WifiObservation};

/// Holds the most recent Wi-Fi and cell observation sets.
///
/// Each update replaces one half of the snapshot wholesale; there is no
/// merging with earlier observations. The store performs no locking itself:
/// the [`Arbiter`](crate::arbiter::Arbiter) keeps it behind the same lock as
/// its dispatch state so that an update and the trigger it causes are
/// serialized together.
#[derive(Debug, Default)]
pub struct SignalStore {
    current: SignalSnapshot,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the Wi-Fi half and return the full snapshot.
    ///
    /// Observations sharing a BSSID collapse to the last one supplied.
    pub fn update_wifi<I>(&mut self, observations: I) -> SignalSnapshot
    where
        I: IntoIterator<Item = WifiObservation>,
    {
        self.current.wifis = observations
            .into_iter()
            .map(|wifi| (wifi.bssid().to_string(), wifi))
            .collect();
        self.current.captured_at = Instant::now();
        self.current.clone()
    }

    /// Replace the cell half and return the full snapshot.
    ///
    /// Observations sharing a cell identity collapse to the last one supplied.
    pub fn update_cells<I>(&mut self, observations: I) -> SignalSnapshot
    where
        I: IntoIterator<Item = CellObservation>,
    {
        self.current.cells = observations
            .into_iter()
            .map(|cell| (cell.identity(), cell))
            .collect();
        self.current.captured_at = Instant::now();
        self.current.clone()
    }

    pub fn clear_wifi(&mut self) {
        self.current.wifis.clear();
    }

    pub fn clear_cells(&mut self) {
        self.current.cells.clear();
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SignalSnapshot {
        self.current.clone()
    }
}
