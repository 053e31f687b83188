//! Core types for agency name parsing.

use crate::states::StateCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust tier for a parsed or geocoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgencyType {
    #[serde(rename = "Police Department")]
    PoliceDepartment,
    #[serde(rename = "Sheriff Office")]
    SheriffOffice,
}

impl AgencyType {
    /// Keyword classification over the whole raw name.
    ///
    /// Plain case-sensitive substring check, so "SOmerville PD" reads as a
    /// sheriff's office.
    pub fn classify(raw_name: &str) -> Self {
        if raw_name.contains("Sheriff") || raw_name.contains("SO") {
            Self::SheriffOffice
        } else {
            Self::PoliceDepartment
        }
    }
}

impl fmt::Display for AgencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoliceDepartment => write!(f, "Police Department"),
            Self::SheriffOffice => write!(f, "Sheriff Office"),
        }
    }
}

/// A raw agency name split into place and agency components.
///
/// `confidence` says how far `city` can be trusted as a literal place
/// name: `Low` means it is a placeholder (the state's own name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub city: String,
    pub state: StateCode,
    pub agency_type: AgencyType,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty agency name")]
    Empty,
    /// No structural rule matched and no state name appears in the text.
    #[error("could not extract a city or state from '{0}'")]
    Unrecognized(String),
}
