//! Batch pipeline: raw agency name → parsed place → coordinates → record.
//!
//! Flow per name:  NameParser → GeocodeResolver
//!                 (parse failure) → StateClassifier → GeocodeResolver
//!                 (unknown state) → unresolved record
//!
//! One bad name never stops the batch. The only abort is a geocoder that
//! stopped answering at the transport level.

use crate::agency::{AgencyType, Confidence, NameParser, ParseError};
use crate::geocode::{GeocodeMethod, GeocodeResolver, GeocodeResult, GeocodeSource};
use crate::oracle::StateClassifier;
use crate::states::StateCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info, warn};

pub const NOTE_UNRESOLVED: &str = "Parse and state classification failed";
pub const NOTE_TIERS_FAILED: &str = "All geocoding tiers failed";
pub const NOTE_UNREACHABLE: &str = "Geocoder unreachable";

/// The consumer-facing record, one per raw agency name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyLocation {
    pub raw_name: String,
    pub city: Option<String>,
    pub state: Option<StateCode>,
    pub agency_type: Option<AgencyType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub confidence: Option<Confidence>,
    pub source: GeocodeSource,
    pub display_name: Option<String>,
    pub method: Option<GeocodeMethod>,
    pub notes: Option<String>,
    pub geocoded_at: DateTime<Utc>,
}

/// How a record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Geocoded,
    /// Had a city/state but no coordinates.
    GeocodeFailed,
    /// Neither the parser nor the oracle found a state.
    ParseSkipped,
}

/// Free-text annotation carrying the method tag and any strip detail.
pub fn notes_for(result: &GeocodeResult) -> String {
    let tag = format!("[Method: {}]", result.method);
    match result.method {
        GeocodeMethod::Original => tag,
        GeocodeMethod::SuffixStripped => format!(
            "{} Stripped \"{}\" → \"{}\"",
            tag,
            result.original_city.as_deref().unwrap_or_default(),
            result.stripped_city.as_deref().unwrap_or_default(),
        ),
        GeocodeMethod::StateLevel => format!("{} Using state-level coordinates (imprecise)", tag),
    }
}

/// Recover the method tag from a record's notes.
pub fn method_from_notes(notes: &str) -> Option<GeocodeMethod> {
    GeocodeMethod::ALL
        .into_iter()
        .find(|m| notes.contains(&format!("[Method: {}]", m)))
}

impl AgencyLocation {
    fn geocoded(
        raw_name: &str,
        city: String,
        state: StateCode,
        agency_type: Option<AgencyType>,
        result: GeocodeResult,
    ) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            city: Some(city),
            state: Some(state),
            agency_type,
            latitude: Some(result.latitude),
            longitude: Some(result.longitude),
            confidence: Some(result.confidence),
            source: result.source,
            notes: Some(notes_for(&result)),
            method: Some(result.method),
            display_name: Some(result.display_name),
            geocoded_at: Utc::now(),
        }
    }

    fn unresolved(raw_name: &str) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            city: None,
            state: None,
            agency_type: None,
            latitude: None,
            longitude: None,
            confidence: None,
            source: GeocodeSource::ExternalService,
            display_name: None,
            method: None,
            notes: Some(NOTE_UNRESOLVED.to_string()),
            geocoded_at: Utc::now(),
        }
    }

    /// The geocoder went away mid-record. Keeps the parse but no
    /// coordinates, so a later run picks the name up again.
    fn unreachable(raw_name: &str, city: String, state: StateCode, agency_type: Option<AgencyType>) -> Self {
        Self {
            city: Some(city),
            state: Some(state),
            agency_type,
            notes: Some(NOTE_UNREACHABLE.to_string()),
            ..Self::unresolved(raw_name)
        }
    }

    fn tiers_failed(raw_name: &str, city: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            notes: Some(NOTE_TIERS_FAILED.to_string()),
            ..Self::unresolved(raw_name)
        }
    }

    pub fn outcome(&self) -> RecordOutcome {
        match (self.latitude, self.longitude, self.city.is_some()) {
            (Some(_), Some(_), _) => RecordOutcome::Geocoded,
            (_, _, true) => RecordOutcome::GeocodeFailed,
            _ => RecordOutcome::ParseSkipped,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("geocoding service unreachable after {processed} record(s); aborting batch")]
    GeocoderUnreachable { processed: usize },
    #[error("cannot write record: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub geocoded: usize,
    pub geocode_failed: usize,
    pub parse_skipped: usize,
    pub geocoder_calls: u64,
    pub oracle_consultations: u64,
    pub oracle_cache_hits: u64,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: RecordOutcome) {
        self.processed += 1;
        match outcome {
            RecordOutcome::Geocoded => self.geocoded += 1,
            RecordOutcome::GeocodeFailed => self.geocode_failed += 1,
            RecordOutcome::ParseSkipped => self.parse_skipped += 1,
        }
    }

    pub fn log(&self) {
        info!("{}", "=".repeat(60));
        info!("GEOCODING SUMMARY");
        info!("Total agencies processed: {}", self.processed);
        info!("Successfully geocoded:   {}", self.geocoded);
        info!("Geocoding failed:        {}", self.geocode_failed);
        info!("Parsing skipped:         {}", self.parse_skipped);
        info!("Geocoder calls:          {}", self.geocoder_calls);
        info!(
            "Oracle consultations:    {} ({} cached)",
            self.oracle_consultations, self.oracle_cache_hits
        );
        info!("{}", "=".repeat(60));
    }
}

/// Coverage breakdown over a set of records.
///
/// Method counts come from the `[Method: ...]` tag in `notes`, the same
/// way a downstream store without a method column reconstructs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageStats {
    pub total: usize,
    pub geocoded: usize,
    pub high_confidence: usize,
    pub medium_confidence: usize,
    pub low_confidence: usize,
    pub method_original: usize,
    pub method_suffix_stripped: usize,
    pub method_state_level: usize,
}

impl CoverageStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AgencyLocation>) -> Self {
        let mut stats = Self::default();
        for r in records {
            stats.total += 1;
            if r.latitude.is_some() && r.longitude.is_some() {
                stats.geocoded += 1;
            }
            match r.confidence {
                Some(Confidence::High) => stats.high_confidence += 1,
                Some(Confidence::Medium) => stats.medium_confidence += 1,
                Some(Confidence::Low) => stats.low_confidence += 1,
                None => {}
            }
            match r.notes.as_deref().and_then(method_from_notes) {
                Some(GeocodeMethod::Original) => stats.method_original += 1,
                Some(GeocodeMethod::SuffixStripped) => stats.method_suffix_stripped += 1,
                Some(GeocodeMethod::StateLevel) => stats.method_state_level += 1,
                None => {}
            }
        }
        stats
    }

    pub fn coverage_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.geocoded as f64 / self.total as f64 * 100.0
        }
    }

    pub fn log(&self) {
        info!("With coordinates:          {} of {} ({:.1}%)", self.geocoded, self.total, self.coverage_pct());
        info!("  - High confidence:       {}", self.high_confidence);
        info!("  - Medium confidence:     {}", self.medium_confidence);
        info!("  - Low confidence:        {}", self.low_confidence);
        info!("Geocoding method breakdown:");
        info!("  - Original query:        {}", self.method_original);
        info!("  - Suffix stripped:       {}", self.method_suffix_stripped);
        info!("  - State-level fallback:  {}", self.method_state_level);
    }
}

/// Trim, drop blanks and repeats, keep first-seen order.
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}

/// Parser, oracle and resolver wired together for one batch run.
pub struct Pipeline {
    parser: NameParser,
    oracle: StateClassifier,
    resolver: GeocodeResolver,
}

impl Pipeline {
    pub fn new(resolver: GeocodeResolver, oracle: StateClassifier) -> Self {
        Self { parser: NameParser::new(), oracle, resolver }
    }

    pub fn resolver(&self) -> &GeocodeResolver {
        &self.resolver
    }

    /// Resolve one raw agency name into a record. Never fails.
    pub fn process(&mut self, raw_name: &str) -> AgencyLocation {
        let parsed = match self.parser.parse(raw_name) {
            Ok(parsed) => parsed,
            Err(ParseError::Empty) => {
                warn!("empty agency name");
                return AgencyLocation::unresolved(raw_name);
            }
            Err(e) => {
                debug!(error = %e, "rule cascade failed; asking state oracle");
                let Some(state) = self.oracle.classify(raw_name) else {
                    warn!(raw_name, "failed to parse agency name (oracle also failed)");
                    return AgencyLocation::unresolved(raw_name);
                };
                info!(raw_name, %state, "oracle classified state");
                let city = format!("{} Agency", state);
                return self.locate(raw_name, city, state, Some(AgencyType::classify(raw_name)));
            }
        };

        self.locate(raw_name, parsed.city, parsed.state, Some(parsed.agency_type))
    }

    /// Geocode a caller-supplied (city, state) pair for `raw_name`, e.g. a
    /// manual correction. An unsupported state token yields a record with
    /// no coordinates rather than a low-confidence fallback.
    pub fn process_pair(&mut self, raw_name: &str, city: &str, state: &str) -> AgencyLocation {
        let Some(code) = StateCode::from_code(state) else {
            warn!(raw_name, city, state, "all geocoding tiers failed: invalid state code");
            return AgencyLocation::tiers_failed(raw_name, city);
        };
        self.locate(raw_name, city.to_string(), code, None)
    }

    /// Geocode and build the record. A centroid produced only because the
    /// guard tripped is not a real fallback and is dropped.
    fn locate(
        &mut self,
        raw_name: &str,
        city: String,
        state: StateCode,
        agency_type: Option<AgencyType>,
    ) -> AgencyLocation {
        let result = self.resolver.geocode(&city, state);
        if self.resolver.connectivity_lost() {
            warn!(raw_name, "geocoder unreachable; record left without coordinates");
            return AgencyLocation::unreachable(raw_name, city, state, agency_type);
        }
        info!(
            raw_name,
            lat = result.latitude,
            lon = result.longitude,
            confidence = %result.confidence,
            method = %result.method,
            "geocoded"
        );
        AgencyLocation::geocoded(raw_name, city, state, agency_type, result)
    }

    /// Process a batch, writing each record as one JSON line.
    ///
    /// Returns the summary, or aborts with `GeocoderUnreachable` once the
    /// resolver has lost connectivity; records already written stay written.
    pub fn run<W: Write>(&mut self, names: &[String], out: &mut W) -> Result<BatchSummary, PipelineError> {
        let mut summary = BatchSummary::default();
        let total = names.len();

        for (i, name) in names.iter().enumerate() {
            info!("[{}/{}] Processing: {}", i + 1, total, name);
            let record = self.process(name);
            summary.record(record.outcome());
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;

            if self.resolver.connectivity_lost() {
                out.flush()?;
                return Err(PipelineError::GeocoderUnreachable { processed: summary.processed });
            }
        }

        out.flush()?;
        summary.geocoder_calls = self.resolver.calls_made();
        summary.oracle_consultations = self.oracle.consultations();
        summary.oracle_cache_hits = self.oracle.cache_hits();
        Ok(summary)
    }
}
