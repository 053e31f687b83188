//! Rate-limited geocoding with a three-tier fallback.
//!
//! Provides the Nominatim client, the provider seam used by tests, a
//! minimum-interval rate limiter, and the resolver that always lands on
//! coordinates for a valid state.

pub mod providers;
pub mod rate_limit;
pub mod resolver;
pub mod types;

pub use providers::{GeocodeProvider, NominatimProvider};
pub use rate_limit::RateLimiter;
pub use resolver::{strip_city_suffixes, GeocodeResolver};
pub use types::{GeocodeError, GeocodeMethod, GeocodeResult, GeocodeSource, PlaceMatch};
