//! Geolocation lookup service client.
//!
//! This module turns a [`SignalSnapshot`](crate::signal::SignalSnapshot) into
//! HTTP requests against the lookup service and parses the answers.
//!
//! # Architecture
//!
//! ```text
//! SignalSnapshot
//!     │
//!     ├── RequestEncoder → LookupRequest (endpoint + base64 `search` param)
//!     │
//!     ├── AsyncHttpClient::get → HttpResponse (status + body)
//!     │
//!     └── parse_response → LocationEstimate | LookupError
//! ```
//!
//! The HTTP client is a trait so tests and hosts can supply their own
//! transport; [`AsyncReqwestClient`] is the production implementation.

mod encoder;
mod error;
mod http;
mod parser;
mod resolve;

pub use encoder::{
    decode_payload, payload_from_url, LookupEndpoints, LookupRequest, RequestEncoder, SourceKind,
    DEFAULT_CELL_URL, DEFAULT_WIFI_URL, SEARCH_PARAM,
};
pub use error::LookupError;
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use parser::{parse_response, RESULT_OK};
pub use resolve::resolve;

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, MockRoutedHttpClient};
