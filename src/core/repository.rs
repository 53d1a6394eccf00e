//! Case repository - the in-memory record set behind every review view

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::loader::LoadedTable;
use crate::core::record::{CaseRecord, ReviewStatus};
use crate::core::schema::{Field, SchemaRegistry};

/// Sentinel shown for any field that is unresolvable, absent or null
pub const MISSING: &str = "N/A";

/// Errors that block a file from being loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("these essential columns are missing in the file: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

/// Loaded QC cases plus the schema used to read them
#[derive(Debug, Clone)]
pub struct CaseRepository {
    schema: SchemaRegistry,
    columns: Vec<String>,
    records: Vec<CaseRecord>,
}

impl CaseRepository {
    /// Build the repository from a loaded table
    ///
    /// Fails if the auditor or address id column cannot be found. Rows
    /// without a status value are assigned [`ReviewStatus::Pending`].
    pub fn load(table: LoadedTable, schema: SchemaRegistry) -> Result<Self, SchemaError> {
        let missing: Vec<String> = Field::MANDATORY
            .iter()
            .map(|field| schema.column(*field))
            .filter(|column| !table.has_column(column))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "rejecting file with missing essential columns");
            return Err(SchemaError::MissingColumns { missing });
        }

        let auditor_col = schema.column(Field::Auditor).to_string();
        let address_col = schema.column(Field::AddressId).to_string();
        let status_col = schema.column(Field::Status).to_string();
        if !table.has_column(&status_col) {
            debug!(column = %status_col, "status column absent, all cases start as Pending");
        }

        let (columns, rows) = table.into_parts();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| {
                let auditor = cells.get(&auditor_col).cloned();
                let address_id = cells.get(&address_col).cloned();
                let status = cells
                    .get(&status_col)
                    .map(|raw| ReviewStatus::parse(raw))
                    .unwrap_or_default();
                CaseRecord::new(idx + 1, auditor, address_id, status, cells)
            })
            .collect::<Vec<_>>();

        debug!(records = records.len(), "case repository built");
        Ok(Self {
            schema,
            columns,
            records,
        })
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Column names exactly as they appeared in the file
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted set of non-null auditor names
    pub fn distinct_auditors(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.auditor())
            .map(str::to_string)
            .collect()
    }

    /// Cases of one auditor, optionally restricted to one status
    ///
    /// Matching is exact and case-sensitive. Load order is preserved.
    pub fn filter(&self, auditor: &str, status: Option<&ReviewStatus>) -> Vec<&CaseRecord> {
        self.records
            .iter()
            .filter(|r| r.auditor() == Some(auditor))
            .filter(|r| status.map_or(true, |s| r.status() == s))
            .collect()
    }

    /// First case with the given address id within a filtered set
    ///
    /// Address ids are not guaranteed unique; the first match in load order
    /// wins.
    pub fn find(
        &self,
        auditor: &str,
        status: Option<&ReviewStatus>,
        address_id: &str,
    ) -> Option<&CaseRecord> {
        self.filter(auditor, status)
            .into_iter()
            .find(|r| r.address_id() == Some(address_id))
    }

    /// Field value by logical name, or [`MISSING`]
    ///
    /// Never fails: unknown logical names, absent columns and null cells all
    /// resolve to the sentinel.
    pub fn get_field<'a>(&'a self, record: &'a CaseRecord, logical_name: &str) -> &'a str {
        match logical_name.parse::<Field>() {
            Ok(field) => self.field(record, field),
            Err(_) => MISSING,
        }
    }

    /// Field value for a typed field, or [`MISSING`]
    pub fn field<'a>(&'a self, record: &'a CaseRecord, field: Field) -> &'a str {
        match field {
            Field::Status => record.status().as_str(),
            _ => record.value(self.schema.column(field)).unwrap_or(MISSING),
        }
    }
}

/// Case counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

impl StatusSummary {
    pub fn of<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CaseRecord>,
    {
        let mut summary = StatusSummary::default();
        for record in records {
            summary.total += 1;
            match record.status() {
                ReviewStatus::Pending => summary.pending += 1,
                ReviewStatus::Completed => summary.completed += 1,
                ReviewStatus::Other(_) => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scenario() -> CaseRepository {
        let table = LoadedTable::from_strings(
            &["auditor", "addressid", "review_status"],
            &[
                &["Alice", "A1", ""],
                &["Alice", "A2", "Completed"],
                &["Bob", "B1", "Pending"],
            ],
        );
        CaseRepository::load(table, SchemaRegistry::default()).unwrap()
    }

    fn ids(records: &[&CaseRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.address_id().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let repo = scenario();

        let auditors: Vec<String> = repo.distinct_auditors().into_iter().collect();
        assert_eq!(auditors, vec!["Alice", "Bob"]);

        let alice = repo.filter("Alice", None);
        assert_eq!(ids(&alice), vec!["A1", "A2"]);
        assert_eq!(alice[0].status(), &ReviewStatus::Pending);
        assert_eq!(alice[1].status(), &ReviewStatus::Completed);

        let pending = repo.filter("Alice", Some(&ReviewStatus::Pending));
        assert_eq!(ids(&pending), vec!["A1"]);

        assert_eq!(repo.get_field(alice[0], "dp_geocodes"), MISSING);
    }

    #[test]
    fn test_missing_status_column_defaults_to_pending() {
        let table = LoadedTable::from_strings(
            &["auditor", "addressid"],
            &[&["Alice", "A1"], &["Bob", "B1"]],
        );
        let repo = CaseRepository::load(table, SchemaRegistry::default()).unwrap();
        assert!(repo
            .records()
            .iter()
            .all(|r| r.status() == &ReviewStatus::Pending));
        assert_eq!(repo.get_field(&repo.records()[0], "status"), "Pending");
    }

    #[test]
    fn test_unknown_status_text_is_preserved() {
        let table = LoadedTable::from_strings(
            &["auditor", "addressid", "review_status"],
            &[&["Alice", "A1", "On hold"], &["Alice", "A2", "completed"]],
        );
        let repo = CaseRepository::load(table, SchemaRegistry::default()).unwrap();
        assert!(repo.filter("Alice", Some(&ReviewStatus::Pending)).is_empty());
        assert!(repo.filter("Alice", Some(&ReviewStatus::Completed)).is_empty());
        assert_eq!(
            ids(&repo.filter("Alice", Some(&ReviewStatus::Other("On hold".into())))),
            vec!["A1"]
        );
    }

    #[test]
    fn test_load_rejects_missing_auditor_column() {
        let table = LoadedTable::from_strings(&["addressid"], &[&["A1"]]);
        let err = CaseRepository::load(table, SchemaRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                missing: vec!["auditor".to_string()]
            }
        );
    }

    #[test]
    fn test_load_rejects_missing_address_column() {
        let table = LoadedTable::from_strings(&["auditor"], &[&["Alice"]]);
        let err = CaseRepository::load(table, SchemaRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                missing: vec!["addressid".to_string()]
            }
        );
    }

    #[test]
    fn test_load_lists_every_missing_column() {
        let table = LoadedTable::from_strings(&["week"], &[]);
        let err = CaseRepository::load(table, SchemaRegistry::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "these essential columns are missing in the file: auditor, addressid"
        );
    }

    #[test]
    fn test_load_uses_overridden_columns() {
        let mut overrides = BTreeMap::new();
        overrides.insert("auditor".to_string(), "Auditor Name".to_string());
        let schema = SchemaRegistry::with_overrides(&overrides).unwrap();

        let table = LoadedTable::from_strings(&["Auditor Name", "addressid"], &[&["Alice", "A1"]]);
        let repo = CaseRepository::load(table, schema).unwrap();
        assert_eq!(repo.filter("Alice", None).len(), 1);
        assert_eq!(repo.get_field(&repo.records()[0], "auditor"), "Alice");
    }

    #[test]
    fn test_filter_unknown_auditor_is_empty() {
        let repo = scenario();
        assert!(repo.filter("Carol", None).is_empty());
        assert!(repo.filter("alice", None).is_empty());
    }

    #[test]
    fn test_filter_matches_brute_force_subset() {
        let repo = scenario();
        for auditor in ["Alice", "Bob", "Carol", ""] {
            let expected: Vec<&CaseRecord> = repo
                .records()
                .iter()
                .filter(|r| r.auditor() == Some(auditor))
                .collect();
            assert_eq!(repo.filter(auditor, None), expected);
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let repo = scenario();
        let status = ReviewStatus::Pending;
        let once = repo.filter("Alice", Some(&status));
        let twice: Vec<&CaseRecord> = once
            .iter()
            .copied()
            .filter(|r| r.auditor() == Some("Alice") && r.status() == &status)
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rows_without_auditor_are_kept_but_never_matched() {
        let table = LoadedTable::from_strings(
            &["auditor", "addressid"],
            &[&["", "X1"], &["Alice", "A1"]],
        );
        let repo = CaseRepository::load(table, SchemaRegistry::default()).unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.distinct_auditors().len(), 1);
        assert_eq!(repo.get_field(&repo.records()[0], "auditor"), MISSING);
    }

    #[test]
    fn test_distinct_auditors_empty_repository() {
        let table = LoadedTable::from_strings(&["auditor", "addressid"], &[]);
        let repo = CaseRepository::load(table, SchemaRegistry::default()).unwrap();
        assert!(repo.is_empty());
        assert!(repo.distinct_auditors().is_empty());
    }

    #[test]
    fn test_get_field_present_null_and_unknown() {
        let table = LoadedTable::from_strings(
            &["auditor", "addressid", "dp_geocodes", "week"],
            &[&["Alice", "A1", "47.6,-122.3", ""]],
        );
        let repo = CaseRepository::load(table, SchemaRegistry::default()).unwrap();
        let record = &repo.records()[0];
        assert_eq!(repo.get_field(record, "dp_geocodes"), "47.6,-122.3");
        assert_eq!(repo.get_field(record, "week"), MISSING);
        assert_eq!(repo.get_field(record, "qc2_source"), MISSING);
        assert_eq!(repo.get_field(record, "not_a_field"), MISSING);
    }

    #[test]
    fn test_get_field_is_total_over_all_fields() {
        let repo = scenario();
        for record in repo.records() {
            for field in Field::ALL {
                let value = repo.get_field(record, field.key());
                assert!(!value.is_empty());
            }
        }
    }

    #[test]
    fn test_find_first_match_wins() {
        let table = LoadedTable::from_strings(
            &["auditor", "addressid", "week"],
            &[&["Alice", "A1", "W1"], &["Alice", "A1", "W2"]],
        );
        let repo = CaseRepository::load(table, SchemaRegistry::default()).unwrap();
        let record = repo.find("Alice", None, "A1").unwrap();
        assert_eq!(repo.get_field(record, "week"), "W1");
        assert!(repo.find("Alice", None, "A9").is_none());
        assert!(repo.find("Bob", None, "A1").is_none());
    }

    #[test]
    fn test_find_respects_status_filter() {
        let repo = scenario();
        assert!(repo.find("Alice", Some(&ReviewStatus::Pending), "A2").is_none());
        assert!(repo.find("Alice", Some(&ReviewStatus::Completed), "A2").is_some());
    }

    #[test]
    fn test_status_summary() {
        let repo = scenario();
        let summary = StatusSummary::of(repo.filter("Alice", None));
        assert_eq!(
            summary,
            StatusSummary {
                total: 2,
                pending: 1,
                completed: 1
            }
        );
        assert_eq!(StatusSummary::of(Vec::new()), StatusSummary::default());
    }

    #[test]
    fn test_columns_are_preserved() {
        let repo = scenario();
        assert_eq!(repo.columns(), &["auditor", "addressid", "review_status"]);
        assert!(repo.has_column("review_status"));
    }
}
