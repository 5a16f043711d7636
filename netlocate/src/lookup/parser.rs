//! Response parsing for the lookup service.
//!
//! The service answers with a JSON envelope:
//!
//! ```text
//! { "result": 200, "data": { "lat": 1.0, "lon": 2.0, "accuracy": 10.0 } }
//! { "result": 404 }
//! ```
//!
//! Only `result == 200` with a complete `data` object yields an estimate.

use std::time::SystemTime;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::encoder::SourceKind;
use super::error::LookupError;
use crate::report::{LocationEstimate, PROVIDER};

/// Status value the service uses for a successful match.
pub const RESULT_OK: i64 = 200;

#[derive(Deserialize)]
struct Coordinates {
    lat: f64,
    lon: f64,
    accuracy: f64,
}

/// Parse a response body into a location estimate.
///
/// # Errors
///
/// - [`LookupError::MalformedResponse`] if the body is not a JSON object with
///   an integer `result`, or a successful result lacks valid coordinates
/// - [`LookupError::LookupMiss`] if `result` is anything other than 200
pub fn parse_response(body: &[u8], source: SourceKind) -> Result<LocationEstimate, LookupError> {
    // Derived structs also accept JSON arrays, so objects are checked by hand.
    let mut envelope: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

    let result = envelope
        .get("result")
        .and_then(Value::as_i64)
        .ok_or_else(|| LookupError::MalformedResponse("missing integer 'result'".to_string()))?;
    if result != RESULT_OK {
        return Err(LookupError::LookupMiss(result));
    }

    let data = match envelope.remove("data") {
        Some(Value::Object(data)) => data,
        Some(_) => {
            return Err(LookupError::MalformedResponse(
                "'data' is not an object".to_string(),
            ))
        }
        None => {
            return Err(LookupError::MalformedResponse(
                "missing 'data' object".to_string(),
            ))
        }
    };
    let coords: Coordinates = serde_json::from_value(Value::Object(data))
        .map_err(|e| LookupError::MalformedResponse(format!("invalid 'data': {}", e)))?;

    validate(&coords)?;

    Ok(LocationEstimate {
        provider: PROVIDER,
        latitude: coords.lat,
        longitude: coords.lon,
        accuracy: coords.accuracy,
        source,
        resolved_at: SystemTime::now(),
    })
}

fn validate(coords: &Coordinates) -> Result<(), LookupError> {
    if !(-90.0..=90.0).contains(&coords.lat) {
        return Err(LookupError::MalformedResponse(format!(
            "latitude {} out of range",
            coords.lat
        )));
    }
    if !(-180.0..=180.0).contains(&coords.lon) {
        return Err(LookupError::MalformedResponse(format!(
            "longitude {} out of range",
            coords.lon
        )));
    }
    if !coords.accuracy.is_finite() || coords.accuracy < 0.0 {
        return Err(LookupError::MalformedResponse(format!(
            "accuracy {} is not a non-negative distance",
            coords.accuracy
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<LocationEstimate, LookupError> {
        parse_response(body.as_bytes(), SourceKind::Wifi)
    }

    #[test]
    fn test_successful_response() {
        let estimate =
            parse(r#"{"result":200,"data":{"lat":1.0,"lon":2.0,"accuracy":10.0}}"#).unwrap();

        assert_eq!(estimate.provider, "mylnikov-geo");
        assert_eq!(estimate.latitude, 1.0);
        assert_eq!(estimate.longitude, 2.0);
        assert_eq!(estimate.accuracy, 10.0);
        assert_eq!(estimate.source, SourceKind::Wifi);
    }

    #[test]
    fn test_source_is_carried() {
        let estimate = parse_response(
            br#"{"result":200,"data":{"lat":3.0,"lon":4.0,"accuracy":50.0}}"#,
            SourceKind::Cell,
        )
        .unwrap();
        assert_eq!(estimate.source, SourceKind::Cell);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let body = r#"{
            "result": 200,
            "data": {"id": "1", "lat": 55.75, "lon": 37.61, "range": 140.0, "accuracy": 140.0, "time": 1},
            "message": "ok"
        }"#;
        let estimate = parse(body).unwrap();
        assert_eq!(estimate.latitude, 55.75);
        assert_eq!(estimate.accuracy, 140.0);
    }

    #[test]
    fn test_integer_coordinates_accepted() {
        let estimate = parse(r#"{"result":200,"data":{"lat":1,"lon":2,"accuracy":0}}"#).unwrap();
        assert_eq!(estimate.latitude, 1.0);
        assert_eq!(estimate.accuracy, 0.0);
    }

    #[test]
    fn test_non_200_is_miss() {
        assert_eq!(parse(r#"{"result":404}"#), Err(LookupError::LookupMiss(404)));
        assert_eq!(
            parse(r#"{"result":500,"data":"garbage"}"#),
            Err(LookupError::LookupMiss(500))
        );
    }

    #[test]
    fn test_missing_result_is_malformed() {
        assert!(matches!(
            parse(r#"{"data":{"lat":1.0,"lon":2.0,"accuracy":10.0}}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_non_integer_result_is_malformed() {
        assert!(matches!(
            parse(r#"{"result":"200"}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_data_is_malformed() {
        assert!(matches!(
            parse(r#"{"result":200}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        assert!(matches!(
            parse(r#"{"result":200,"data":{"lat":1.0,"lon":2.0}}"#),
            Err(LookupError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse(r#"{"result":200,"data":{"lat":"1.0","lon":2.0,"accuracy":3.0}}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_negative_accuracy_is_malformed() {
        assert!(matches!(
            parse(r#"{"result":200,"data":{"lat":1.0,"lon":2.0,"accuracy":-1.0}}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_out_of_range_coordinates_are_malformed() {
        assert!(matches!(
            parse(r#"{"result":200,"data":{"lat":91.0,"lon":2.0,"accuracy":1.0}}"#),
            Err(LookupError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse(r#"{"result":200,"data":{"lat":1.0,"lon":-181.0,"accuracy":1.0}}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_array_envelope_is_malformed() {
        assert!(matches!(
            parse("[200,[1.0,2.0,10.0]]"),
            Err(LookupError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse("200"),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_array_data_is_malformed() {
        assert!(matches!(
            parse(r#"{"result":200,"data":[1.0,2.0,10.0]}"#),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            parse("<html>Bad Gateway</html>"),
            Err(LookupError::MalformedResponse(_))
        ));
        assert!(matches!(parse(""), Err(LookupError::MalformedResponse(_))));
    }
}
