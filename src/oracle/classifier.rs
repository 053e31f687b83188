//! State classification for names the parser could not read.
//!
//! Flow:  cache → federal keyword pre-filter (→ DC) → backend → token check

use super::cache::VerdictCache;
use super::client::{MessagesBackend, OracleBackend};
use crate::config::OracleConfig;
use crate::states::StateCode;
use tracing::{debug, error, warn};

/// Substrings that mark a federal or national body.
const FEDERAL_PHRASES: &[&str] = &["federal", "national", "united states", "postal"];
/// Short tokens that only count as whole words ("us" must not hit "Campus").
const FEDERAL_WORDS: &[&str] = &["us", "usa", "fbi", "atf", "ncmec"];

pub fn is_federal(raw_name: &str) -> bool {
    let lower = raw_name.to_lowercase();
    if FEDERAL_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| FEDERAL_WORDS.contains(&word))
}

/// Interpret the oracle's answer. Anything but a known code is unknown.
pub fn parse_token(text: &str) -> Option<StateCode> {
    let token = text.trim().to_uppercase();
    if token == "UNKNOWN" {
        return None;
    }
    let code = StateCode::from_code(&token);
    if code.is_none() {
        debug!(token = %token, "oracle returned an invalid state token");
    }
    code
}

/// Best-guess state for free text, with a per-run cache.
///
/// Without a backend every name classifies as unknown.
pub struct StateClassifier {
    backend: Option<Box<dyn OracleBackend>>,
    cache: VerdictCache,
    consultations: u64,
}

impl StateClassifier {
    pub fn new(backend: Box<dyn OracleBackend>) -> Self {
        Self { backend: Some(backend), cache: VerdictCache::new(), consultations: 0 }
    }

    /// A classifier that always answers unknown.
    pub fn disabled() -> Self {
        Self { backend: None, cache: VerdictCache::new(), consultations: 0 }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        match MessagesBackend::from_config(config) {
            Some(backend) => Self::new(Box::new(backend)),
            None => {
                warn!("no oracle API key set; state classification will be skipped");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Backend round trips made so far.
    pub fn consultations(&self) -> u64 {
        self.consultations
    }

    /// Names answered from the per-run cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache.hits()
    }

    pub fn classify(&mut self, raw_name: &str) -> Option<StateCode> {
        let Some(backend) = self.backend.as_ref() else {
            return None;
        };

        if let Some(verdict) = self.cache.get(raw_name) {
            return verdict;
        }

        if is_federal(raw_name) {
            debug!(raw_name, "classified as federal agency → DC");
            self.cache.put(raw_name, Some(StateCode::DC));
            return Some(StateCode::DC);
        }

        self.consultations += 1;
        let verdict = match backend.ask(raw_name) {
            Ok(text) => {
                let verdict = parse_token(&text);
                match verdict {
                    Some(state) => debug!(raw_name, %state, "oracle classified state"),
                    None => debug!(raw_name, "oracle could not determine state"),
                }
                verdict
            }
            Err(e) => {
                error!(raw_name, error = %e, "state classification failed");
                None
            }
        };

        self.cache.put(raw_name, verdict);
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::client::OracleError;
    use std::cell::Cell;
    use std::rc::Rc;

    struct ScriptedBackend {
        reply: Result<String, OracleError>,
        calls: Rc<Cell<u32>>,
    }

    impl OracleBackend for ScriptedBackend {
        fn ask(&self, _raw_name: &str) -> Result<String, OracleError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    fn classifier(reply: Result<&str, OracleError>) -> (StateClassifier, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let backend = ScriptedBackend { reply: reply.map(str::to_string), calls: calls.clone() };
        (StateClassifier::new(Box::new(backend)), calls)
    }

    #[test]
    fn test_classifies_and_caches() {
        let (mut c, calls) = classifier(Ok("al"));
        assert_eq!(c.classify("Blount County Commission (AL)"), Some(StateCode::AL));
        assert_eq!(c.classify("Blount County Commission (AL)"), Some(StateCode::AL));
        assert_eq!(calls.get(), 1);
        assert_eq!(c.consultations(), 1);
        assert_eq!(c.cache_hits(), 1);
    }

    #[test]
    fn test_unknown_is_cached() {
        let (mut c, calls) = classifier(Ok("UNKNOWN"));
        assert_eq!(c.classify("Metro Task Force"), None);
        assert_eq!(c.classify("Metro Task Force"), None);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_invalid_token_is_unknown() {
        let (mut c, _) = classifier(Ok("Texas"));
        assert_eq!(c.classify("Lone Star Task Force"), None);
    }

    #[test]
    fn test_backend_error_is_unknown_and_cached() {
        let (mut c, calls) = classifier(Err(OracleError::Status(529)));
        assert_eq!(c.classify("Some Agency"), None);
        assert_eq!(c.classify("Some Agency"), None);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_federal_short_circuit() {
        let (mut c, calls) = classifier(Ok("TX"));
        assert_eq!(c.classify("FBI Houston Field Office"), Some(StateCode::DC));
        assert_eq!(c.classify("US Postal Inspection Service"), Some(StateCode::DC));
        assert_eq!(c.classify("National Center for Missing Children"), Some(StateCode::DC));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_is_federal_whole_words() {
        assert!(is_federal("ATF"));
        assert!(is_federal("USA Task Force"));
        assert!(is_federal("Federal Reserve Police"));
        assert!(!is_federal("Campus Safety"));
        assert!(!is_federal("Hatfield Township"));
    }

    #[test]
    fn test_disabled_always_unknown() {
        let mut c = StateClassifier::disabled();
        assert!(!c.is_enabled());
        assert_eq!(c.classify("FBI"), None);
        assert_eq!(c.classify("Blount County Commission (AL)"), None);
    }

    #[test]
    fn test_from_config_without_key_is_disabled() {
        let config = OracleConfig { api_key: None, ..OracleConfig::default() };
        assert!(!StateClassifier::from_config(&config).is_enabled());
        let config = OracleConfig { api_key: Some("k".into()), enabled: false, ..OracleConfig::default() };
        assert!(!StateClassifier::from_config(&config).is_enabled());
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token(" tx \n"), Some(StateCode::TX));
        assert_eq!(parse_token("UNKNOWN"), None);
        assert_eq!(parse_token("XX"), None);
    }
}
