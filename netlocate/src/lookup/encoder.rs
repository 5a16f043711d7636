//! Request encoding for the lookup service.
//!
//! Each observation becomes one `;`-terminated record of `,`-separated
//! fields. The concatenated records are base64 encoded and sent as the
//! `search` query parameter of the endpoint for that source kind:
//!
//! ```text
//! Wi-Fi: <bssid>,<signal>;<bssid>,<signal>;...
//! Cell:  <mcc>,<mnc>,<lac>,<cid>,<signal>;...
//! ```
//!
//! The service ignores record order; the encoder uses the snapshot's own
//! stable order so identical snapshots give identical URLs.

use std::fmt;
use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;

use super::error::LookupError;
use crate::signal::SignalSnapshot;

/// Default Wi-Fi lookup endpoint.
pub const DEFAULT_WIFI_URL: &str = "https://api.mylnikov.org/geolocation/wifi?v=1.1";

/// Default cell lookup endpoint.
pub const DEFAULT_CELL_URL: &str = "https://api.mylnikov.org/geolocation/cell?v=1.1";

/// Query parameter carrying the encoded observations.
pub const SEARCH_PARAM: &str = "search";

const RECORD_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/// Which signal source a lookup resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Wifi,
    Cell,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Wifi => f.write_str("wifi"),
            SourceKind::Cell => f.write_str("cell"),
        }
    }
}

/// Service endpoints, one per source kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEndpoints {
    pub wifi: String,
    pub cell: String,
}

impl Default for LookupEndpoints {
    fn default() -> Self {
        Self {
            wifi: DEFAULT_WIFI_URL.to_string(),
            cell: DEFAULT_CELL_URL.to_string(),
        }
    }
}

/// A ready-to-fetch lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Source this request resolves.
    pub source: SourceKind,
    /// Full URL including the encoded `search` parameter.
    pub url: String,
    /// The record string before base64 encoding.
    pub payload: String,
}

/// Serializes snapshot halves into lookup requests.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    wifi_url: Url,
    cell_url: Url,
}

impl RequestEncoder {
    /// Create an encoder for the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidEndpoint`] if either endpoint is not an
    /// absolute URL.
    pub fn new(endpoints: &LookupEndpoints) -> Result<Self, LookupError> {
        Ok(Self {
            wifi_url: parse_endpoint(&endpoints.wifi)?,
            cell_url: parse_endpoint(&endpoints.cell)?,
        })
    }

    /// Build the Wi-Fi request, or `None` when the snapshot has no access points.
    ///
    /// No minimum count is enforced here; the arbiter decides eligibility.
    pub fn encode_wifi(&self, snapshot: &SignalSnapshot) -> Option<LookupRequest> {
        if snapshot.wifi_count() == 0 {
            return None;
        }

        let mut payload = String::new();
        for wifi in snapshot.wifis() {
            let _ = write!(
                payload,
                "{}{FIELD_SEPARATOR}{}{RECORD_SEPARATOR}",
                wifi.bssid(),
                wifi.signal()
            );
        }

        Some(self.request(SourceKind::Wifi, payload))
    }

    /// Build the cell request, or `None` when the snapshot has no cells.
    pub fn encode_cells(&self, snapshot: &SignalSnapshot) -> Option<LookupRequest> {
        if snapshot.cell_count() == 0 {
            return None;
        }

        let mut payload = String::new();
        for cell in snapshot.cells() {
            let _ = write!(
                payload,
                "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{RECORD_SEPARATOR}",
                cell.mcc(),
                cell.mnc(),
                cell.lac(),
                cell.cid(),
                cell.signal()
            );
        }

        Some(self.request(SourceKind::Cell, payload))
    }

    fn request(&self, source: SourceKind, payload: String) -> LookupRequest {
        let mut url = match source {
            SourceKind::Wifi => self.wifi_url.clone(),
            SourceKind::Cell => self.cell_url.clone(),
        };
        url.query_pairs_mut()
            .append_pair(SEARCH_PARAM, &STANDARD.encode(payload.as_bytes()));

        LookupRequest {
            source,
            url: url.into(),
            payload,
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, LookupError> {
    let url = Url::parse(raw).map_err(|e| LookupError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(LookupError::InvalidEndpoint {
            url: raw.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }

    Ok(url)
}

/// Split a record string back into records and fields.
pub fn decode_payload(payload: &str) -> Vec<Vec<String>> {
    payload
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.is_empty())
        .map(|record| record.split(FIELD_SEPARATOR).map(str::to_string).collect())
        .collect()
}

/// Extract and decode the `search` parameter of a request URL.
///
/// Returns `None` if the parameter is missing or not valid base64 UTF-8.
pub fn payload_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let (_, encoded) = url.query_pairs().find(|(key, _)| key == SEARCH_PARAM)?;
    let bytes = STANDARD.decode(encoded.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}
