//! Core module - schema, loading and case lookup

pub mod config;
pub mod decision;
pub mod loader;
pub mod record;
pub mod repository;
pub mod schema;

pub use config::Config;
pub use decision::{Decision, DecisionError, DecisionRecord, DecisionSink, SessionDecisions};
pub use loader::{load_table, LoadError, LoadedTable, TableFormat};
pub use record::{CaseRecord, ReviewStatus};
pub use repository::{CaseRepository, SchemaError, StatusSummary, MISSING};
pub use schema::{ConfigurationError, Field, SchemaRegistry};
