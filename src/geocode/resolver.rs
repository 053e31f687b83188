//! Geocode resolver: orchestrates the fallback chain.
//!
//! Flow:  original "{city}, {state}, USA" → suffix-stripped variants →
//! state centroid
//!
//! Every external lookup goes through one rate limiter, so each variant
//! a request walks through costs one full interval.

use super::providers::{GeocodeProvider, NominatimProvider};
use super::rate_limit::RateLimiter;
use super::types::{GeocodeResult, PlaceMatch};
use crate::config::GeocoderConfig;
use crate::states::StateCode;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Organizational words that show up at the end of agency "city" names
/// but are not part of any place name.
pub const CITY_SUFFIXES: &[&str] = &[
    "Division",
    "Department",
    "Dept",
    "Bureau",
    "Office",
    "Police",
    "Sheriff",
    "Services",
    "Administration",
];

static SUFFIX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CITY_SUFFIXES
        .iter()
        .map(|s| Regex::new(&format!(r"(?i)\s+{}s?\s*$", regex::escape(s))).unwrap())
        .collect()
});

/// City-name variants to try, original first.
///
/// Each suffix is stripped from the original independently (not
/// cumulatively); duplicates and empty results are dropped.
pub fn strip_city_suffixes(city: &str) -> Vec<String> {
    let mut variants = vec![city.to_string()];
    for pattern in SUFFIX_PATTERNS.iter() {
        let stripped = pattern.replace(city, "");
        if stripped == city {
            continue;
        }
        let stripped = stripped.trim();
        if !stripped.is_empty() && !variants.iter().any(|v| v == stripped) {
            variants.push(stripped.to_string());
        }
    }
    variants
}

/// The geocode resolver with its fallback pipeline.
///
/// Constructed once per batch; owns the rate limiter for the lifetime of
/// the run.
pub struct GeocodeResolver {
    provider: Box<dyn GeocodeProvider>,
    limiter: RateLimiter,
    /// Consecutive transport failures that mark the service unreachable (0 = never).
    unreachable_after: u32,
    transport_failures: u32,
    calls: u64,
}

impl GeocodeResolver {
    /// Resolver backed by Nominatim with the configured endpoint and limits.
    pub fn from_config(config: &GeocoderConfig) -> Self {
        Self::new(Box::new(NominatimProvider::new(config)), config)
    }

    pub fn new(provider: Box<dyn GeocodeProvider>, config: &GeocoderConfig) -> Self {
        Self {
            provider,
            limiter: RateLimiter::new(Duration::from_millis(config.min_interval_ms)),
            unreachable_after: config.unreachable_after,
            transport_failures: 0,
            calls: 0,
        }
    }

    /// Geocode a (city, state) pair. Total over valid state codes: the
    /// centroid tier always answers.
    pub fn geocode(&mut self, city: &str, state: StateCode) -> GeocodeResult {
        // 1. Original city name
        if let Some(place) = self.lookup(city, state) {
            debug!(city, %state, "geocoded via original query");
            return GeocodeResult::original(place);
        }

        // 2. Suffix-stripped variants
        let variants = strip_city_suffixes(city);
        if variants.len() > 1 {
            debug!(city, count = variants.len() - 1, "trying stripped variants");
        }
        for variant in variants.iter().skip(1) {
            if let Some(place) = self.lookup(variant, state) {
                info!(original = city, stripped = %variant, %state, "geocoded via suffix stripping");
                return GeocodeResult::suffix_stripped(place, city, variant);
            }
        }

        // 3. State centroid
        if self.connectivity_lost() {
            debug!(city, %state, "geocoder unreachable; centroid only");
        } else {
            info!(city, %state, "using state-level coordinates (imprecise fallback)");
        }
        GeocodeResult::state_level(state)
    }

    /// True once the configured number of consecutive transport failures
    /// has been reached. The resolver then stops calling out.
    pub fn connectivity_lost(&self) -> bool {
        self.unreachable_after > 0 && self.transport_failures >= self.unreachable_after
    }

    /// External calls issued so far.
    pub fn calls_made(&self) -> u64 {
        self.calls
    }

    /// One throttled lookup. Every failure reads as "no result".
    ///
    /// Any reply from the service, hit or miss, clears the transport
    /// failure streak.
    fn lookup(&mut self, city: &str, state: StateCode) -> Option<PlaceMatch> {
        if self.connectivity_lost() {
            return None;
        }

        let query = format!("{}, {}, USA", city, state);
        let waited = self.limiter.acquire();
        if !waited.is_zero() {
            debug!(waited_ms = waited.as_millis() as u64, "rate limited");
        }
        self.calls += 1;

        match self.provider.search(&query) {
            Ok(place) => {
                self.transport_failures = 0;
                Some(place)
            }
            Err(e) => {
                debug!(query = %query, error = %e, "geocode lookup missed");
                if !e.is_transport() {
                    self.transport_failures = 0;
                    return None;
                }
                self.transport_failures += 1;
                if self.connectivity_lost() {
                    warn!(failures = self.transport_failures, "geocoder unreachable; skipping further lookups");
                }
                None
            }
        }
    }
}
