//! Per-run verdict cache for the state oracle.
//!
//! Keys are exact raw names. Negative verdicts are cached too, so an
//! unclassifiable name costs at most one consultation per run.

use crate::states::StateCode;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct VerdictCache {
    entries: HashMap<String, Option<StateCode>>,
    hits: u64,
}

impl VerdictCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(verdict)` on a hit, where the verdict itself may be `None`
    /// (previously classified as unknown).
    pub fn get(&mut self, raw_name: &str) -> Option<Option<StateCode>> {
        let verdict = self.entries.get(raw_name).copied();
        if verdict.is_some() {
            self.hits += 1;
        }
        verdict
    }

    pub fn put(&mut self, raw_name: &str, verdict: Option<StateCode>) {
        self.entries.insert(raw_name.to_string(), verdict);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}
