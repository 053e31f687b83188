//! Geocoding providers: the lookup seam and the Nominatim client.

use super::types::{GeocodeError, PlaceMatch};
use crate::config::GeocoderConfig;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// A single-query place lookup.
///
/// Implementations do one network round trip per call and report every
/// miss as an error; throttling and fallback are the resolver's job.
pub trait GeocodeProvider {
    fn search(&self, query: &str) -> Result<PlaceMatch, GeocodeError>;
}

// ─── Nominatim provider ─────────────────────────────────────────

/// Raw search hit. Nominatim encodes floats as strings; we accept both.
#[derive(Deserialize, Debug, Clone)]
struct NominatimResult {
    #[serde(default)]
    lat: Option<Value>,
    #[serde(default)]
    lon: Option<Value>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    importance: Option<Value>,
}

fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl NominatimResult {
    fn into_place(self) -> Result<PlaceMatch, GeocodeError> {
        let lat = coerce_f64(self.lat.as_ref())
            .ok_or_else(|| GeocodeError::Malformed("missing or non-numeric lat".into()))?;
        let lon = coerce_f64(self.lon.as_ref())
            .ok_or_else(|| GeocodeError::Malformed("missing or non-numeric lon".into()))?;
        Ok(PlaceMatch {
            lat,
            lon,
            display_name: self.display_name.unwrap_or_default(),
            importance: coerce_f64(self.importance.as_ref()).unwrap_or(0.0),
        })
    }
}

/// Parse a Nominatim `format=json` search body and take the first hit.
pub fn parse_search_response(query: &str, results: Vec<Value>) -> Result<PlaceMatch, GeocodeError> {
    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?;
    let hit: NominatimResult =
        serde_json::from_value(first).map_err(|e| GeocodeError::Malformed(e.to_string()))?;
    hit.into_place()
}

/// OpenStreetMap Nominatim search client.
pub struct NominatimProvider {
    agent: ureq::Agent,
    endpoint: String,
    user_agent: String,
}

impl NominatimProvider {
    pub fn new(config: &GeocoderConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl GeocodeProvider for NominatimProvider {
    fn search(&self, query: &str) -> Result<PlaceMatch, GeocodeError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .set("User-Agent", &self.user_agent)
            .query("q", query)
            .query("format", "json")
            .query("limit", "1")
            .query("addressdetails", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => GeocodeError::Status(code),
                ureq::Error::Transport(t) => GeocodeError::Transport(t.to_string()),
            })?;

        let results: Vec<Value> = response
            .into_json()
            .map_err(|e| GeocodeError::Malformed(e.to_string()))?;

        parse_search_response(query, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_encoded_floats() {
        let body = vec![json!({
            "lat": "29.7589382",
            "lon": "-95.3676974",
            "display_name": "Houston, Harris County, Texas, United States",
            "importance": 0.7524
        })];
        let place = parse_search_response("Houston, TX, USA", body).unwrap();
        approx::assert_abs_diff_eq!(place.lat, 29.7589382);
        approx::assert_abs_diff_eq!(place.lon, -95.3676974);
        approx::assert_abs_diff_eq!(place.importance, 0.7524);
        assert!(place.display_name.starts_with("Houston"));
    }

    #[test]
    fn test_parse_importance_as_string_and_missing() {
        let body = vec![json!({"lat": 1.5, "lon": "2.5", "importance": "0.3"})];
        let place = parse_search_response("q", body).unwrap();
        approx::assert_abs_diff_eq!(place.importance, 0.3);
        assert_eq!(place.display_name, "");

        let body = vec![json!({"lat": "1", "lon": "2"})];
        assert_eq!(parse_search_response("q", body).unwrap().importance, 0.0);
    }

    #[test]
    fn test_parse_empty_is_not_found() {
        let err = parse_search_response("Nowhere, WY, USA", vec![]).unwrap_err();
        assert_eq!(err, GeocodeError::NotFound("Nowhere, WY, USA".into()));
    }

    #[test]
    fn test_parse_malformed() {
        let body = vec![json!({"lat": "north", "lon": "2"})];
        assert!(matches!(
            parse_search_response("q", body),
            Err(GeocodeError::Malformed(_))
        ));

        let body = vec![json!({"lon": "2"})];
        assert!(matches!(
            parse_search_response("q", body),
            Err(GeocodeError::Malformed(_))
        ));

        let body = vec![json!("not an object")];
        assert!(matches!(
            parse_search_response("q", body),
            Err(GeocodeError::Malformed(_))
        ));
    }
}
