//! US state, DC and territory codes.
//!
//! Each code carries its full name (for free-text scanning) and an
//! approximate geographic center used as the last-resort geocode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A US state, the District of Columbia, or a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateCode {
    AL, AK, AZ, AR, CA, CO, CT, DE, FL, GA,
    HI, ID, IL, IN, IA, KS, KY, LA, ME, MD,
    MA, MI, MN, MS, MO, MT, NE, NV, NH, NJ,
    NM, NY, NC, ND, OH, OK, OR, PA, RI, SC,
    SD, TN, TX, UT, VT, VA, WA, WV, WI, WY,
    DC,
    // Territories
    AS, GU, MP, PR, UM, VI,
}

struct StateEntry {
    code: StateCode,
    abbr: &'static str,
    /// Lowercase full name; `None` for territories (never scanned for).
    name: Option<&'static str>,
    lat: f64,
    lon: f64,
}

// Centers from U.S. Census Bureau geographic centers (approximate for territories).
const STATES: &[StateEntry] = &[
    StateEntry { code: StateCode::AL, abbr: "AL", name: Some("alabama"), lat: 32.806671, lon: -86.791130 },
    StateEntry { code: StateCode::AK, abbr: "AK", name: Some("alaska"), lat: 61.370716, lon: -152.404419 },
    StateEntry { code: StateCode::AZ, abbr: "AZ", name: Some("arizona"), lat: 33.729759, lon: -111.431221 },
    StateEntry { code: StateCode::AR, abbr: "AR", name: Some("arkansas"), lat: 34.969704, lon: -92.373123 },
    StateEntry { code: StateCode::CA, abbr: "CA", name: Some("california"), lat: 36.116203, lon: -119.681564 },
    StateEntry { code: StateCode::CO, abbr: "CO", name: Some("colorado"), lat: 39.059811, lon: -105.311104 },
    StateEntry { code: StateCode::CT, abbr: "CT", name: Some("connecticut"), lat: 41.597782, lon: -72.755371 },
    StateEntry { code: StateCode::DE, abbr: "DE", name: Some("delaware"), lat: 39.318523, lon: -75.507141 },
    StateEntry { code: StateCode::FL, abbr: "FL", name: Some("florida"), lat: 27.766279, lon: -81.686783 },
    StateEntry { code: StateCode::GA, abbr: "GA", name: Some("georgia"), lat: 33.040619, lon: -83.643074 },
    StateEntry { code: StateCode::HI, abbr: "HI", name: Some("hawaii"), lat: 21.094318, lon: -157.498337 },
    StateEntry { code: StateCode::ID, abbr: "ID", name: Some("idaho"), lat: 44.240459, lon: -114.478828 },
    StateEntry { code: StateCode::IL, abbr: "IL", name: Some("illinois"), lat: 40.349457, lon: -88.986137 },
    StateEntry { code: StateCode::IN, abbr: "IN", name: Some("indiana"), lat: 39.849426, lon: -86.258278 },
    StateEntry { code: StateCode::IA, abbr: "IA", name: Some("iowa"), lat: 42.011539, lon: -93.210526 },
    StateEntry { code: StateCode::KS, abbr: "KS", name: Some("kansas"), lat: 38.526600, lon: -96.726486 },
    StateEntry { code: StateCode::KY, abbr: "KY", name: Some("kentucky"), lat: 37.668140, lon: -84.670067 },
    StateEntry { code: StateCode::LA, abbr: "LA", name: Some("louisiana"), lat: 31.169546, lon: -91.867805 },
    StateEntry { code: StateCode::ME, abbr: "ME", name: Some("maine"), lat: 44.693947, lon: -69.381927 },
    StateEntry { code: StateCode::MD, abbr: "MD", name: Some("maryland"), lat: 39.063946, lon: -76.802101 },
    StateEntry { code: StateCode::MA, abbr: "MA", name: Some("massachusetts"), lat: 42.230171, lon: -71.530106 },
    StateEntry { code: StateCode::MI, abbr: "MI", name: Some("michigan"), lat: 43.326618, lon: -84.536095 },
    StateEntry { code: StateCode::MN, abbr: "MN", name: Some("minnesota"), lat: 45.694454, lon: -93.900192 },
    StateEntry { code: StateCode::MS, abbr: "MS", name: Some("mississippi"), lat: 32.741646, lon: -89.678696 },
    StateEntry { code: StateCode::MO, abbr: "MO", name: Some("missouri"), lat: 38.456085, lon: -92.288368 },
    StateEntry { code: StateCode::MT, abbr: "MT", name: Some("montana"), lat: 46.921925, lon: -110.454353 },
    StateEntry { code: StateCode::NE, abbr: "NE", name: Some("nebraska"), lat: 41.125370, lon: -98.268082 },
    StateEntry { code: StateCode::NV, abbr: "NV", name: Some("nevada"), lat: 38.313515, lon: -117.055374 },
    StateEntry { code: StateCode::NH, abbr: "NH", name: Some("new hampshire"), lat: 43.452492, lon: -71.563896 },
    StateEntry { code: StateCode::NJ, abbr: "NJ", name: Some("new jersey"), lat: 40.298904, lon: -74.521011 },
    StateEntry { code: StateCode::NM, abbr: "NM", name: Some("new mexico"), lat: 34.840515, lon: -106.248482 },
    StateEntry { code: StateCode::NY, abbr: "NY", name: Some("new york"), lat: 42.165726, lon: -74.948051 },
    StateEntry { code: StateCode::NC, abbr: "NC", name: Some("north carolina"), lat: 35.630066, lon: -79.806419 },
    StateEntry { code: StateCode::ND, abbr: "ND", name: Some("north dakota"), lat: 47.528912, lon: -99.784012 },
    StateEntry { code: StateCode::OH, abbr: "OH", name: Some("ohio"), lat: 40.388783, lon: -82.764915 },
    StateEntry { code: StateCode::OK, abbr: "OK", name: Some("oklahoma"), lat: 35.565342, lon: -96.928917 },
    StateEntry { code: StateCode::OR, abbr: "OR", name: Some("oregon"), lat: 44.572021, lon: -122.070938 },
    StateEntry { code: StateCode::PA, abbr: "PA", name: Some("pennsylvania"), lat: 40.590752, lon: -77.209755 },
    StateEntry { code: StateCode::RI, abbr: "RI", name: Some("rhode island"), lat: 41.680893, lon: -71.511780 },
    StateEntry { code: StateCode::SC, abbr: "SC", name: Some("south carolina"), lat: 33.856892, lon: -80.945007 },
    StateEntry { code: StateCode::SD, abbr: "SD", name: Some("south dakota"), lat: 44.299782, lon: -99.438828 },
    StateEntry { code: StateCode::TN, abbr: "TN", name: Some("tennessee"), lat: 35.747845, lon: -86.692345 },
    StateEntry { code: StateCode::TX, abbr: "TX", name: Some("texas"), lat: 31.054487, lon: -97.563461 },
    StateEntry { code: StateCode::UT, abbr: "UT", name: Some("utah"), lat: 40.150032, lon: -111.862434 },
    StateEntry { code: StateCode::VT, abbr: "VT", name: Some("vermont"), lat: 44.045876, lon: -72.710686 },
    StateEntry { code: StateCode::VA, abbr: "VA", name: Some("virginia"), lat: 37.769337, lon: -78.169968 },
    StateEntry { code: StateCode::WA, abbr: "WA", name: Some("washington"), lat: 47.400902, lon: -121.490494 },
    StateEntry { code: StateCode::WV, abbr: "WV", name: Some("west virginia"), lat: 38.491226, lon: -80.954453 },
    StateEntry { code: StateCode::WI, abbr: "WI", name: Some("wisconsin"), lat: 44.268543, lon: -89.616508 },
    StateEntry { code: StateCode::WY, abbr: "WY", name: Some("wyoming"), lat: 42.755966, lon: -107.302490 },
    StateEntry { code: StateCode::DC, abbr: "DC", name: Some("district of columbia"), lat: 38.907192, lon: -77.036871 },
    StateEntry { code: StateCode::AS, abbr: "AS", name: None, lat: -14.270972, lon: -170.132217 },
    StateEntry { code: StateCode::GU, abbr: "GU", name: None, lat: 13.444304, lon: 144.793731 },
    StateEntry { code: StateCode::MP, abbr: "MP", name: None, lat: 15.097500, lon: 145.673889 },
    StateEntry { code: StateCode::PR, abbr: "PR", name: None, lat: 18.282833, lon: -66.590149 },
    StateEntry { code: StateCode::UM, abbr: "UM", name: None, lat: 19.282778, lon: 166.647222 },
    StateEntry { code: StateCode::VI, abbr: "VI", name: None, lat: 18.335765, lon: -64.896335 },
];

impl StateCode {
    fn entry(self) -> &'static StateEntry {
        // Table order matches declaration order.
        &STATES[self as usize]
    }

    /// All supported codes, states first, then DC, then territories.
    pub fn all() -> impl Iterator<Item = StateCode> {
        STATES.iter().map(|e| e.code)
    }

    /// Look up an exact two-letter code. Case-sensitive: "tx" is not a code.
    pub fn from_code(code: &str) -> Option<StateCode> {
        STATES.iter().find(|e| e.abbr == code).map(|e| e.code)
    }

    pub fn as_str(self) -> &'static str {
        self.entry().abbr
    }

    /// Title-cased full name ("New York", "District Of Columbia"), if the
    /// code is a state or DC.
    pub fn full_name(self) -> Option<String> {
        self.entry().name.map(title_case)
    }

    /// Approximate geographic center as (latitude, longitude).
    pub fn centroid(self) -> (f64, f64) {
        let e = self.entry();
        (e.lat, e.lon)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a token is not one of the supported codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a US state or territory code")]
pub struct UnknownStateCode(pub String);

impl FromStr for StateCode {
    type Err = UnknownStateCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateCode::from_code(s).ok_or_else(|| UnknownStateCode(s.to_string()))
    }
}

impl TryFrom<String> for StateCode {
    type Error = UnknownStateCode;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> String {
        code.as_str().to_string()
    }
}

/// Scan free text for an embedded full state name (case-insensitive).
///
/// Longer names are tried first so "west virginia" beats "virginia" and
/// "arkansas" beats "kansas".
pub fn find_state_name(text: &str) -> Option<StateCode> {
    let lower = text.to_lowercase();
    let mut named: Vec<&StateEntry> = STATES.iter().filter(|e| e.name.is_some()).collect();
    named.sort_by_key(|e| std::cmp::Reverse(e.name.map_or(0, str::len)));

    named
        .into_iter()
        .find(|e| e.name.is_some_and(|n| lower.contains(n)))
        .map(|e| e.code)
}

/// Title case: first letter of each whitespace word upper-cased.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_declaration_order() {
        for (i, e) in STATES.iter().enumerate() {
            assert_eq!(e.code as usize, i, "{} out of order", e.abbr);
            assert_eq!(format!("{:?}", e.code), e.abbr);
        }
        assert_eq!(StateCode::all().count(), 57);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(StateCode::from_code("TX"), Some(StateCode::TX));
        assert_eq!(StateCode::from_code("PR"), Some(StateCode::PR));
        assert_eq!(StateCode::from_code("tx"), None);
        assert_eq!(StateCode::from_code("ZZ"), None);
        assert!("QQ".parse::<StateCode>().is_err());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(StateCode::NY.full_name().as_deref(), Some("New York"));
        assert_eq!(StateCode::DC.full_name().as_deref(), Some("District Of Columbia"));
        assert_eq!(StateCode::GU.full_name(), None);
    }

    #[test]
    fn test_find_state_name_prefers_longest() {
        assert_eq!(find_state_name("West Virginia State Police"), Some(StateCode::WV));
        assert_eq!(find_state_name("Arkansas Game and Fish"), Some(StateCode::AR));
        assert_eq!(find_state_name("NEW YORK STATE PATROL"), Some(StateCode::NY));
        assert_eq!(find_state_name("Blount County Commission"), None);
    }

    #[test]
    fn test_centroid() {
        let (lat, lon) = StateCode::WY.centroid();
        approx::assert_abs_diff_eq!(lat, 42.755966);
        approx::assert_abs_diff_eq!(lon, -107.302490);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&StateCode::OH).unwrap();
        assert_eq!(json, "\"OH\"");
        let back: StateCode = serde_json::from_str("\"OH\"").unwrap();
        assert_eq!(back, StateCode::OH);
        assert!(serde_json::from_str::<StateCode>("\"XX\"").is_err());
    }
}
