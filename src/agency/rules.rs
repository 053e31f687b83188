//! The ordered pattern cascade for agency names.
//!
//! Rules are tried top to bottom and the first match wins, so order is
//! part of the behavior. Specific shapes (county, parish, "Division of")
//! come before the generic "City ST Agency" shapes they would otherwise be
//! swallowed by, and the bare "City ST" rule is always last.
//!
//! Every rule captures exactly two groups: a city and a state token, in
//! either order. The parser decides which is which.

use super::types::Confidence;
use regex::Regex;
use std::sync::LazyLock;

pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub confidence: Confidence,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, confidence: Confidence) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            confidence,
        }
    }

    /// Match against a trimmed name, returning the two raw capture groups.
    pub fn captures<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.pattern.captures(name)?;
        Some((caps.get(1)?.as_str().trim(), caps.get(2)?.as_str().trim()))
    }
}

pub static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    use Confidence::{High, Medium};
    vec![
        // "Houston TX PD", "Denver CO Police Department"
        Rule::new(
            "city_state_agency",
            r"^([A-Z][a-z\s\-]+?)\s+([A-Z]{2})\s+(?:P(?:olice)?D?|Sheriff|SO|Police Dept|Department|Division|Bureau)$",
            High,
        ),
        // "Harris County TX SO". The capital C of "County" already keeps the
        // rule above from matching, but "County" must never end up in the city.
        Rule::new(
            "county_state_agency",
            r"^([A-Z][a-z\s\-]+?)\s+County\s+([A-Z]{2})\s+(?:SO|Sheriff|Police)$",
            High,
        ),
        // "Cleveland OH Division of Police"
        Rule::new(
            "city_state_division_of",
            r"^([A-Z][a-z\s\-]+?)\s+([A-Z]{2})\s+Division\s+of\s+(?:Police|Sheriff)$",
            High,
        ),
        // "Aztec PD - NM"
        Rule::new(
            "city_agency_dash_state",
            r"^([A-Z][a-z\s\-\.]+?)\s+(?:P(?:olice)?D?|Sheriff|SO|PD)\s*-\s*([A-Z]{2})$",
            High,
        ),
        // "Arlington PD (WA)", "Salem Police (OR)"
        Rule::new(
            "city_agency_paren_state",
            r"^([A-Z][a-z\s\-\.]+?)\s+(?:P(?:olice)?D?|Sheriff|SO)\s*\(([A-Z]{2})\)$",
            High,
        ),
        // "AR - Alma PD". State comes first; weaker because a leading
        // two-letter token is not always a state.
        Rule::new(
            "state_dash_city_agency",
            r"^([A-Z]{2})\s*-\s*([A-Z][a-z\s\-\.]+?)\s+(?:P(?:olice)?D?|Sheriff|SO|Department|Dept)$",
            Medium,
        ),
        // "Bienville Parish LA SO"
        Rule::new(
            "parish_state_agency",
            r"^([A-Z][a-z\s\-]+?)\s+(?:Parish|County)\s+([A-Z]{2})\s+(?:SO|Sheriff|Police|PD)$",
            High,
        ),
        // "Amberley Village OH PD": each word capitalized.
        Rule::new(
            "multiword_city_state_agency",
            r"^([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)\s+([A-Z]{2})\s+(?:P(?:olice)?D?|Sheriff|SO|Department|Dept)$",
            High,
        ),
        // "Bay St. Louis MS PD", "Port St. Lucie FL Police"
        Rule::new(
            "dotted_city_state_agency",
            r"^([A-Z][a-z]+(?:\s+[A-Z]?[a-z]+\.?)+)\s+([A-Z]{2})\s+(?:P(?:olice)?D?|Sheriff|SO|Department|Dept)$",
            High,
        ),
        // "Blaine CO OK SO": CO abbreviates County here, not Colorado.
        Rule::new(
            "co_county_state_agency",
            r"^([A-Z][a-z\s\-]+?)\s+CO\s+([A-Z]{2})\s+(?:SO|Sheriff|Police)$",
            High,
        ),
        // "Houston TX": no agency token at all.
        Rule::new(
            "city_state",
            r"^([A-Z][a-z\s\-]+?)\s+([A-Z]{2})$",
            Medium,
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(name: &str) -> Option<(&'static str, String, String)> {
        RULES.iter().find_map(|r| {
            r.captures(name)
                .map(|(a, b)| (r.name, a.to_string(), b.to_string()))
        })
    }

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(RULES.len(), 11);
        assert_eq!(RULES.last().unwrap().name, "city_state");
    }

    #[test]
    fn test_county_before_generic() {
        let (rule, city, state) = first_match("Harris County TX SO").unwrap();
        assert_eq!(rule, "county_state_agency");
        assert_eq!(city, "Harris");
        assert_eq!(state, "TX");
    }

    #[test]
    fn test_division_of() {
        let (rule, city, _) = first_match("Cleveland OH Division of Police").unwrap();
        assert_eq!(rule, "city_state_division_of");
        assert_eq!(city, "Cleveland");
    }

    #[test]
    fn test_state_first_capture_order() {
        let (rule, a, b) = first_match("AR - Alma PD").unwrap();
        assert_eq!(rule, "state_dash_city_agency");
        assert_eq!(a, "AR");
        assert_eq!(b, "Alma");
    }

    #[test]
    fn test_paren_and_dash_state() {
        assert_eq!(first_match("Arlington PD (WA)").unwrap().0, "city_agency_paren_state");
        assert_eq!(first_match("Aztec PD - NM").unwrap().0, "city_agency_dash_state");
    }

    #[test]
    fn test_multiword_and_dotted() {
        let (rule, city, _) = first_match("Amberley Village OH PD").unwrap();
        assert_eq!(rule, "multiword_city_state_agency");
        assert_eq!(city, "Amberley Village");

        let (rule, city, state) = first_match("Bay St. Louis MS PD").unwrap();
        assert_eq!(rule, "dotted_city_state_agency");
        assert_eq!(city, "Bay St. Louis");
        assert_eq!(state, "MS");
    }

    #[test]
    fn test_co_as_county() {
        let (rule, city, state) = first_match("Blaine CO OK SO").unwrap();
        assert_eq!(rule, "co_county_state_agency");
        assert_eq!(city, "Blaine");
        assert_eq!(state, "OK");
    }

    #[test]
    fn test_bare_city_state_last() {
        let (rule, city, state) = first_match("Houston TX").unwrap();
        assert_eq!(rule, "city_state");
        assert_eq!((city.as_str(), state.as_str()), ("Houston", "TX"));
    }

    #[test]
    fn test_no_match() {
        assert!(first_match("California Department of Corrections").is_none());
    }
}
