//! QCR: QC review toolkit
//!
//! Loads an audited QC export (CSV, TSV or spreadsheet), maps its columns to
//! a fixed set of review fields and lets an auditor browse and answer the
//! cases assigned to them.

pub mod cli;
pub mod core;
