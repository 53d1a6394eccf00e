//! Case records - one row of an uploaded QC file

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Review status of a case
///
/// Files may carry arbitrary text in the status column. Anything other than
/// the two known values is kept verbatim so that filtering stays an exact
/// string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ReviewStatus {
    #[default]
    Pending,
    Completed,
    Other(String),
}

impl ReviewStatus {
    /// Parse a raw cell value; matching is exact and case-sensitive
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => ReviewStatus::Pending,
            "Completed" => ReviewStatus::Completed,
            other => ReviewStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Completed => "Completed",
            ReviewStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "completed" => Ok(ReviewStatus::Completed),
            _ => Err(format!("Unknown review status: {}", s)),
        }
    }
}

impl Serialize for ReviewStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single audit record as loaded from the source file
///
/// Only non-null cells are stored; a column that is absent from `cells`
/// was either missing from the file or blank on this row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    row: usize,
    auditor: Option<String>,
    address_id: Option<String>,
    status: ReviewStatus,
    cells: HashMap<String, String>,
}

impl CaseRecord {
    pub(crate) fn new(
        row: usize,
        auditor: Option<String>,
        address_id: Option<String>,
        status: ReviewStatus,
        cells: HashMap<String, String>,
    ) -> Self {
        Self {
            row,
            auditor,
            address_id,
            status,
            cells,
        }
    }

    /// 1-based position of the record in the source file (header excluded)
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn auditor(&self) -> Option<&str> {
        self.auditor.as_deref()
    }

    pub fn address_id(&self) -> Option<&str> {
        self.address_id.as_deref()
    }

    pub fn status(&self) -> &ReviewStatus {
        &self.status
    }

    /// Raw cell value by column name, `None` when absent or null
    pub fn value(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}
