//! Reviewer decisions on QC cases
//!
//! A reviewer either agrees with the QC finding or appeals it, optionally
//! with free-text notes. Decisions are handed to a [`DecisionSink`]; the
//! only sink shipped here keeps them for the current session and never
//! writes them back into the loaded file or the repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("a decision needs a non-empty address id")]
    EmptyAddressId,
}

/// Reviewer verdict on a QC finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Agree,
    Appeal,
}

impl Decision {
    pub const ALL: [Decision; 2] = [Decision::Agree, Decision::Appeal];

    /// Label shown to the reviewer
    pub fn label(self) -> &'static str {
        match self {
            Decision::Agree => "Agree with QC",
            Decision::Appeal => "Appeal",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agree" | "agree with qc" => Ok(Decision::Agree),
            "appeal" => Ok(Decision::Appeal),
            _ => Err(format!("Unknown decision: {} (expected agree or appeal)", s)),
        }
    }
}

/// A decision as captured for one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRecord {
    pub address_id: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Destination for reviewer decisions
pub trait DecisionSink {
    fn save_decision(
        &mut self,
        address_id: &str,
        decision: Decision,
        notes: &str,
    ) -> Result<&DecisionRecord, DecisionError>;
}

/// In-memory decisions for the current session only
#[derive(Debug, Default)]
pub struct SessionDecisions {
    entries: Vec<DecisionRecord>,
}

impl SessionDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[DecisionRecord] {
        &self.entries
    }

    /// Most recent decision for a case
    pub fn latest(&self, address_id: &str) -> Option<&DecisionRecord> {
        self.entries.iter().rev().find(|d| d.address_id == address_id)
    }
}

impl DecisionSink for SessionDecisions {
    fn save_decision(
        &mut self,
        address_id: &str,
        decision: Decision,
        notes: &str,
    ) -> Result<&DecisionRecord, DecisionError> {
        let address_id = address_id.trim();
        if address_id.is_empty() {
            return Err(DecisionError::EmptyAddressId);
        }

        let notes = notes.trim();
        let record = DecisionRecord {
            address_id: address_id.to_string(),
            decision,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            recorded_at: Utc::now(),
        };
        info!(address_id = %record.address_id, decision = ?decision, "decision captured");

        self.entries.push(record);
        Ok(&self.entries[self.entries.len() - 1])
    }
}
