//! One fetch-and-parse round trip.

use tracing::{debug, trace};

use super::encoder::LookupRequest;
use super::error::LookupError;
use super::http::AsyncHttpClient;
use super::parser::parse_response;
use crate::report::LocationEstimate;

/// Longest error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Fetch a lookup request and parse the answer.
///
/// A non-2xx status becomes [`LookupError::HttpStatus`] carrying the start of
/// the error body, so the caller can log what the service said.
pub async fn resolve<C: AsyncHttpClient>(
    client: &C,
    request: &LookupRequest,
) -> Result<LocationEstimate, LookupError> {
    trace!(source = %request.source, url = %request.url, "Resolving lookup");

    let response = client.get(&request.url).await?;

    if !response.is_success() {
        return Err(LookupError::HttpStatus {
            status: response.status,
            body: truncate_body(&response.body),
        });
    }

    debug!(
        source = %request.source,
        response = %String::from_utf8_lossy(&response.body),
        "Lookup response"
    );

    parse_response(&response.body, request.source)
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::encoder::SourceKind;
    use crate::lookup::http::tests::MockAsyncHttpClient;
    use crate::lookup::http::HttpResponse;

    fn request() -> LookupRequest {
        LookupRequest {
            source: SourceKind::Cell,
            url: "https://example.com/cell?search=x".to_string(),
            payload: "1,2,3,4,-90;".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let client = MockAsyncHttpClient::new(Ok(HttpResponse::ok(
            r#"{"result":200,"data":{"lat":3.0,"lon":4.0,"accuracy":50.0}}"#,
        )));

        let estimate = resolve(&client, &request()).await.unwrap();
        assert_eq!(estimate.latitude, 3.0);
        assert_eq!(estimate.source, SourceKind::Cell);
        assert_eq!(
            *client.requests.lock().unwrap(),
            vec!["https://example.com/cell?search=x".to_string()]
        );
    }

    #[tokio::test]
    async fn test_resolve_http_status() {
        let client = MockAsyncHttpClient::new(Ok(HttpResponse::new(503, "overloaded")));

        let result = resolve(&client, &request()).await;
        assert_eq!(
            result,
            Err(LookupError::HttpStatus {
                status: 503,
                body: "overloaded".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_resolve_transport_error() {
        let client = MockAsyncHttpClient::new(Err(LookupError::Transport("reset".to_string())));

        let result = resolve(&client, &request()).await;
        assert_eq!(result, Err(LookupError::Transport("reset".to_string())));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body(b"short"), "short");

        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let truncated = truncate_body(long.as_bytes());
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
        assert!(truncated.ends_with("..."));
    }
}
