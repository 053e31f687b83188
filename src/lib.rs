//! Agency Locator: normalize law-enforcement agency names into
//! (city, state) pairs and geocode them under a strict rate limit.
//!
//! The pipeline is sequential by design: one [`geocode::GeocodeResolver`]
//! per run owns the only rate-limiter clock.

pub mod agency;
pub mod config;
pub mod geocode;
pub mod oracle;
pub mod pipeline;
pub mod states;

pub use agency::{AgencyType, Confidence, NameParser, ParseError, ParsedName};
pub use geocode::{GeocodeMethod, GeocodeResolver, GeocodeResult, GeocodeSource};
pub use oracle::StateClassifier;
pub use pipeline::{AgencyLocation, BatchSummary, CoverageStats, Pipeline, PipelineError};
pub use states::StateCode;
