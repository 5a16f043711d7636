//! Arbitrary Strength Unit (ASU) conversion.
//!
//! Lookup requests carry raw dBm, so nothing in the request path calls this.
//! It exists for services that want normalised strengths. Scales follow
//! 3GPP TS 27.007 (GSM, UMTS), TS 36.133 (LTE) and the usual CDMA bars table.

use super::types::{CellObservation, RadioType};

/// CDMA thresholds in dBm, paired with the ASU they map to.
const CDMA_LEVELS: [(i32, i32); 5] = [(-75, 16), (-82, 8), (-90, 4), (-95, 2), (-100, 1)];

impl RadioType {
    /// Convert a signal strength in dBm to ASU for this radio type.
    ///
    /// Ranges: GSM 0..=31, UMTS -5..=91, LTE 0..=95, CDMA one of 0, 1, 2, 4, 8, 16.
    pub fn asu(self, dbm: i32) -> i32 {
        match self {
            RadioType::Gsm => ((dbm + 113) / 2).clamp(0, 31),
            RadioType::Umts => (dbm + 116).clamp(-5, 91),
            RadioType::Lte => (dbm + 140).clamp(0, 95),
            RadioType::Cdma => CDMA_LEVELS
                .iter()
                .find(|(threshold, _)| dbm >= *threshold)
                .map(|(_, asu)| *asu)
                .unwrap_or(0),
        }
    }
}

impl CellObservation {
    /// Signal strength of this cell in ASU.
    pub fn asu(&self) -> i32 {
        self.radio().asu(self.signal())
    }
}
