//! Error types for geolocation lookups.

use thiserror::Error;

/// Errors that can occur while resolving observations against the service.
///
/// None of these reach the consumer: a dispatch logs them and either falls
/// back to the next source or ends the attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// Network or I/O failure reaching the service.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from lookup service: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body does not have the expected JSON shape.
    #[error("Malformed lookup response: {0}")]
    MalformedResponse(String),

    /// The service understood the request but has no position for it.
    #[error("No location match (result {0})")]
    LookupMiss(i64),

    /// A configured service endpoint is not a valid URL.
    #[error("Invalid lookup endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl LookupError {
    /// Whether this is the normal negative outcome rather than a failure.
    pub fn is_miss(&self) -> bool {
        matches!(self, LookupError::LookupMiss(_))
    }
}
