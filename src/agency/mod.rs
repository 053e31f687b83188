//! Agency name normalization.
//!
//! Turns free-text law-enforcement agency names ("Houston TX PD",
//! "AR - Alma PD") into a structured city/state/type record.

pub mod parser;
pub mod rules;
pub mod types;

pub use parser::NameParser;
pub use types::{AgencyType, Confidence, ParseError, ParsedName};
