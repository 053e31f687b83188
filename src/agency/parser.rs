//! NameParser: raw agency name → (city, state, agency type, confidence).
//!
//! Flow:  trimmed name → rule cascade (first match wins) → embedded
//! state-name scan → failure.

use super::rules::{Rule, RULES};
use super::types::{AgencyType, Confidence, ParseError, ParsedName};
use crate::states::{self, StateCode};
use tracing::debug;

/// Stateless parser over the static rule cascade.
pub struct NameParser {
    rules: &'static [Rule],
}

impl Default for NameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NameParser {
    pub fn new() -> Self {
        Self { rules: RULES.as_slice() }
    }

    /// Parse a raw organization name.
    ///
    /// Never fails on well-formed text that mentions a state somewhere;
    /// the worst case is a `Low` confidence record whose city is the
    /// state's own name.
    pub fn parse(&self, raw_name: &str) -> Result<ParsedName, ParseError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(ParseError::Empty);
        }

        let agency_type = AgencyType::classify(name);

        for rule in self.rules {
            let Some((first, second)) = rule.captures(name) else {
                continue;
            };
            let Some((city, state)) = assign_roles(first, second) else {
                debug!(rule = rule.name, name, "rule matched but state token is invalid");
                continue;
            };

            debug!(rule = rule.name, name, city, %state, "parsed agency name");
            return Ok(ParsedName {
                city: city.to_string(),
                state,
                agency_type,
                confidence: rule.confidence,
            });
        }

        // State-level agencies: "California Department of Corrections"
        if let Some(state) = states::find_state_name(name) {
            let city = state.full_name().unwrap_or_else(|| state.to_string());
            debug!(name, %state, "no rule matched; using embedded state name");
            return Ok(ParsedName {
                city,
                state,
                agency_type,
                confidence: Confidence::Low,
            });
        }

        Err(ParseError::Unrecognized(name.to_string()))
    }
}

/// Decide which capture is the state.
///
/// A first group that is itself a two-letter state code means the
/// state-first layout ("AR - Alma PD"); otherwise the first group is the
/// city. Returns `None` when the chosen state token is not a valid code.
fn assign_roles<'a>(first: &'a str, second: &'a str) -> Option<(&'a str, StateCode)> {
    if first.len() == 2 {
        if let Some(state) = StateCode::from_code(first) {
            return Some((second, state));
        }
    }
    let state = StateCode::from_code(&second.to_uppercase())?;
    Some((first, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> Result<ParsedName, ParseError> {
        NameParser::new().parse(name)
    }

    #[test]
    fn test_city_state_pd() {
        let p = parse("Houston TX PD").unwrap();
        assert_eq!(p.city, "Houston");
        assert_eq!(p.state, StateCode::TX);
        assert_eq!(p.agency_type, AgencyType::PoliceDepartment);
        assert_eq!(p.confidence, Confidence::High);
    }

    #[test]
    fn test_county_sheriff() {
        let p = parse("Harris County TX SO").unwrap();
        assert_eq!(p.city, "Harris");
        assert_eq!(p.state, StateCode::TX);
        assert_eq!(p.agency_type, AgencyType::SheriffOffice);
        assert_eq!(p.confidence, Confidence::High);
    }

    #[test]
    fn test_state_first() {
        let p = parse("AR - Alma PD").unwrap();
        assert_eq!(p.city, "Alma");
        assert_eq!(p.state, StateCode::AR);
        assert_eq!(p.agency_type, AgencyType::PoliceDepartment);
        assert_eq!(p.confidence, Confidence::Medium);
    }

    #[test]
    fn test_state_name_fallback() {
        let p = parse("California Department of Corrections").unwrap();
        assert_eq!(p.city, "California");
        assert_eq!(p.state, StateCode::CA);
        assert_eq!(p.confidence, Confidence::Low);
    }

    #[test]
    fn test_multiword_state_name_fallback() {
        let p = parse("North Carolina State Highway Patrol").unwrap();
        assert_eq!(p.city, "North Carolina");
        assert_eq!(p.state, StateCode::NC);
        assert_eq!(p.confidence, Confidence::Low);
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_unrecognized() {
        assert!(matches!(
            parse("Blount County Commission (AL)"),
            Err(ParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_invalid_state_token_continues_cascade() {
        // "ZZ" is not a state; no later rule matches and no state name is embedded.
        assert!(parse("Springfield ZZ PD").is_err());
    }

    #[test]
    fn test_trims_input() {
        let p = parse("  Denver CO Police  ").unwrap();
        assert_eq!(p.city, "Denver");
        assert_eq!(p.state, StateCode::CO);
    }

    #[test]
    fn test_sheriff_keyword() {
        let p = parse("Salem Sheriff (OR)").unwrap();
        assert_eq!(p.state, StateCode::OR);
        assert_eq!(p.agency_type, AgencyType::SheriffOffice);
    }

    #[test]
    fn test_so_substring_misclassifies() {
        // Keyword check is a bare substring match.
        assert_eq!(AgencyType::classify("SOmerville PD"), AgencyType::SheriffOffice);
        assert_eq!(AgencyType::classify("Somerville PD"), AgencyType::PoliceDepartment);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = NameParser::new();
        assert_eq!(parser.parse("Bay St. Louis MS PD"), parser.parse("Bay St. Louis MS PD"));
    }
}
