//! Core types for the geocoding subsystem.

use crate::agency::Confidence;
use crate::states::StateCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeocodeSource {
    #[serde(rename = "nominatim")]
    ExternalService,
    #[serde(rename = "state_fallback")]
    StateCentroid,
}

impl fmt::Display for GeocodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternalService => write!(f, "nominatim"),
            Self::StateCentroid => write!(f, "state_fallback"),
        }
    }
}

/// Which fallback tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeMethod {
    Original,
    SuffixStripped,
    StateLevel,
}

impl GeocodeMethod {
    pub const ALL: [GeocodeMethod; 3] = [Self::Original, Self::SuffixStripped, Self::StateLevel];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::SuffixStripped => "suffix_stripped",
            Self::StateLevel => "state_level",
        }
    }
}

impl fmt::Display for GeocodeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single place returned by the external geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMatch {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    /// Provider relevance score, 0.0 when absent.
    pub importance: f64,
}

impl PlaceMatch {
    pub fn confidence(&self) -> Confidence {
        importance_confidence(self.importance)
    }
}

/// Map a provider importance score onto a confidence tier.
pub fn importance_confidence(importance: f64) -> Confidence {
    if importance > 0.5 {
        Confidence::High
    } else if importance > 0.1 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Coordinates for a (city, state) query plus how they were obtained.
///
/// Built only through the constructors below, which keep `method`,
/// `source`, `confidence` and the stripped-city fields consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub confidence: Confidence,
    pub source: GeocodeSource,
    pub method: GeocodeMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripped_city: Option<String>,
}

impl GeocodeResult {
    pub(crate) fn original(place: PlaceMatch) -> Self {
        Self {
            latitude: place.lat,
            longitude: place.lon,
            confidence: place.confidence(),
            display_name: place.display_name,
            source: GeocodeSource::ExternalService,
            method: GeocodeMethod::Original,
            original_city: None,
            stripped_city: None,
        }
    }

    pub(crate) fn suffix_stripped(place: PlaceMatch, original_city: &str, stripped_city: &str) -> Self {
        debug_assert_ne!(original_city, stripped_city);
        Self {
            method: GeocodeMethod::SuffixStripped,
            original_city: Some(original_city.to_string()),
            stripped_city: Some(stripped_city.to_string()),
            ..Self::original(place)
        }
    }

    pub(crate) fn state_level(state: StateCode) -> Self {
        let (latitude, longitude) = state.centroid();
        Self {
            latitude,
            longitude,
            display_name: format!("{}, USA (state-level fallback)", state),
            confidence: Confidence::Low,
            source: GeocodeSource::StateCentroid,
            method: GeocodeMethod::StateLevel,
            original_city: None,
            stripped_city: None,
        }
    }
}

/// A failed single lookup. Never surfaces past the resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("geocoder returned HTTP {0}")]
    Status(u16),
    #[error("invalid geocoder response: {0}")]
    Malformed(String),
    #[error("no match for '{0}'")]
    NotFound(String),
}

impl GeocodeError {
    /// Connection-level failure, as opposed to a reply we did not like.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_thresholds() {
        assert_eq!(importance_confidence(0.75), Confidence::High);
        assert_eq!(importance_confidence(0.5), Confidence::Medium);
        assert_eq!(importance_confidence(0.11), Confidence::Medium);
        assert_eq!(importance_confidence(0.1), Confidence::Low);
        assert_eq!(importance_confidence(0.0), Confidence::Low);
    }

    #[test]
    fn test_state_level_invariants() {
        let r = GeocodeResult::state_level(StateCode::TX);
        assert_eq!(r.method, GeocodeMethod::StateLevel);
        assert_eq!(r.source, GeocodeSource::StateCentroid);
        assert_eq!(r.confidence, Confidence::Low);
        assert_eq!(r.display_name, "TX, USA (state-level fallback)");
        assert_eq!((r.latitude, r.longitude), StateCode::TX.centroid());
    }

    #[test]
    fn test_serialized_tags() {
        let r = GeocodeResult::state_level(StateCode::WY);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["source"], "state_fallback");
        assert_eq!(v["method"], "state_level");
        assert_eq!(v["confidence"], "low");
        assert!(v.get("original_city").is_none());
    }
}
