//! Schema registry - logical field names mapped to source column names
//!
//! Display and filtering code never hardcodes raw column strings. Every
//! lookup goes through a [`SchemaRegistry`], which starts from the built-in
//! column names and may be overridden per field from configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a logical field name is not part of the known set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown logical field '{0}'")]
    UnknownField(String),

    #[error("column name for field '{0}' must not be empty")]
    EmptyColumn(String),
}

/// A logical field of a QC case record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // Identification
    Auditor,
    AddressId,
    Week,
    Program,
    TrackingId,

    // Delivery point bucket
    PreDpGeocodes,
    DpGeocodes,
    AuditorDpGranularity,
    QcDpGranularity,
    Qc2Dp,
    DpDisagreement,
    ReasonDp,

    // Road entry bucket
    PreReGeocodes,
    ReGeocodes,
    AuditorReGranularity,
    QcReGranularity,
    Qc2Re,
    ReDisagreement,
    ReasonRe,

    // Geofence bucket
    PreTolerance,
    PostTolerance,
    Qc2Tolerance,
    GeofenceDisagreement,
    ReasonGeofence,

    // Overall
    ActionTaken,
    AuditorComment,
    Qc2Comment,
    Qc2Source,
    Qc2GamIssue,

    /// Review status (Pending / Completed), created at load time when absent
    Status,
}

impl Field {
    /// Every logical field, in display order
    pub const ALL: [Field; 30] = [
        Field::Auditor,
        Field::AddressId,
        Field::Week,
        Field::Program,
        Field::TrackingId,
        Field::PreDpGeocodes,
        Field::DpGeocodes,
        Field::AuditorDpGranularity,
        Field::QcDpGranularity,
        Field::Qc2Dp,
        Field::DpDisagreement,
        Field::ReasonDp,
        Field::PreReGeocodes,
        Field::ReGeocodes,
        Field::AuditorReGranularity,
        Field::QcReGranularity,
        Field::Qc2Re,
        Field::ReDisagreement,
        Field::ReasonRe,
        Field::PreTolerance,
        Field::PostTolerance,
        Field::Qc2Tolerance,
        Field::GeofenceDisagreement,
        Field::ReasonGeofence,
        Field::ActionTaken,
        Field::AuditorComment,
        Field::Qc2Comment,
        Field::Qc2Source,
        Field::Qc2GamIssue,
        Field::Status,
    ];

    /// Fields a file must carry for the cases to be usable at all
    pub const MANDATORY: [Field; 2] = [Field::Auditor, Field::AddressId];

    /// Stable snake_case key used in configuration and `get_field` lookups
    pub fn key(self) -> &'static str {
        match self {
            Field::Auditor => "auditor",
            Field::AddressId => "address_id",
            Field::Week => "week",
            Field::Program => "program",
            Field::TrackingId => "tracking_id",
            Field::PreDpGeocodes => "pre_dp_geocodes",
            Field::DpGeocodes => "dp_geocodes",
            Field::AuditorDpGranularity => "auditor_dp_granularity",
            Field::QcDpGranularity => "qc_dp_granularity",
            Field::Qc2Dp => "qc2_dp",
            Field::DpDisagreement => "dp_disagreement",
            Field::ReasonDp => "reason_dp",
            Field::PreReGeocodes => "pre_re_geocodes",
            Field::ReGeocodes => "re_geocodes",
            Field::AuditorReGranularity => "auditor_re_granularity",
            Field::QcReGranularity => "qc_re_granularity",
            Field::Qc2Re => "qc2_re",
            Field::ReDisagreement => "re_disagreement",
            Field::ReasonRe => "reason_re",
            Field::PreTolerance => "pre_tolerance",
            Field::PostTolerance => "post_tolerance",
            Field::Qc2Tolerance => "qc2_tolerance",
            Field::GeofenceDisagreement => "geofence_disagreement",
            Field::ReasonGeofence => "reason_geofence",
            Field::ActionTaken => "action_taken",
            Field::AuditorComment => "auditor_comment",
            Field::Qc2Comment => "qc2_comment",
            Field::Qc2Source => "qc2_source",
            Field::Qc2GamIssue => "qc2_gam_issue",
            Field::Status => "status",
        }
    }

    /// Column name used by QC exports when no override is configured
    pub fn default_column(self) -> &'static str {
        match self {
            Field::Auditor => "auditor",
            Field::AddressId => "addressid",
            Field::Week => "week",
            Field::Program => "program",
            Field::TrackingId => "trackingid",
            Field::PreDpGeocodes => "pdp_pre_dp_geocodes",
            Field::DpGeocodes => "dp_geocodes",
            Field::AuditorDpGranularity => "auditor_granularity_dp",
            Field::QcDpGranularity => "qc_dp_granularity",
            Field::Qc2Dp => "qc2_dp",
            Field::DpDisagreement => "dp_disagreement",
            Field::ReasonDp => "reason_dp_issue",
            Field::PreReGeocodes => "pre_re_geocodes",
            Field::ReGeocodes => "re_geocodes",
            Field::AuditorReGranularity => "auditor_granularity_re",
            Field::QcReGranularity => "qc_re_granularity",
            Field::Qc2Re => "qc2_re",
            Field::ReDisagreement => "re_disagreement",
            Field::ReasonRe => "reason_re_issue",
            Field::PreTolerance => "auditor_pre_tolerance",
            Field::PostTolerance => "post_tolerance",
            Field::Qc2Tolerance => "qc2_tolerance",
            Field::GeofenceDisagreement => "geofence_disagreement",
            Field::ReasonGeofence => "reason_geofence_issue",
            Field::ActionTaken => "action_taken",
            Field::AuditorComment => "auditor_comment",
            Field::Qc2Comment => "qc2_comment",
            Field::Qc2Source => "qc2_source",
            Field::Qc2GamIssue => "qc2_gam_issue",
            Field::Status => "review_status",
        }
    }

    /// Human-readable label for case detail output
    pub fn label(self) -> &'static str {
        match self {
            Field::Auditor => "auditor",
            Field::AddressId => "addressid",
            Field::Week => "week",
            Field::Program => "program",
            Field::TrackingId => "trackingid",
            Field::PreDpGeocodes => "PDP / Pre-DP geocodes (before auditing)",
            Field::DpGeocodes => "DP geocodes (after auditing)",
            Field::AuditorDpGranularity => "Auditor DP granularity",
            Field::QcDpGranularity => "QC DP granularity",
            Field::Qc2Dp => "QC2 DP bucket",
            Field::DpDisagreement => "DP disagreement flag",
            Field::ReasonDp => "Reason DP issue",
            Field::PreReGeocodes => "PRE (RE) geocodes (before auditing)",
            Field::ReGeocodes => "RE geocodes (after auditing)",
            Field::AuditorReGranularity => "Auditor RE granularity",
            Field::QcReGranularity => "QC RE granularity",
            Field::Qc2Re => "QC2 RE bucket",
            Field::ReDisagreement => "RE disagreement flag",
            Field::ReasonRe => "Reason RE issue",
            Field::PreTolerance => "Auditor pre-tolerance (before auditing)",
            Field::PostTolerance => "Auditor post-tolerance (after auditing)",
            Field::Qc2Tolerance => "QC2 tolerance",
            Field::GeofenceDisagreement => "Geofence disagreement flag",
            Field::ReasonGeofence => "Reason geofence issue",
            Field::ActionTaken => "Action taken",
            Field::AuditorComment => "Auditor comment",
            Field::Qc2Comment => "QC2 comment (why auditor is incorrect)",
            Field::Qc2Source => "QC2 source",
            Field::Qc2GamIssue => "QC2 GAM issue",
            Field::Status => "status",
        }
    }

    /// True for the disagreement flags raised by QC
    pub fn is_disagreement(self) -> bool {
        matches!(
            self,
            Field::DpDisagreement | Field::ReDisagreement | Field::GeofenceDisagreement
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| ConfigurationError::UnknownField(s.to_string()))
    }
}

/// Immutable mapping from logical fields to column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    columns: BTreeMap<Field, String>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let columns = Field::ALL
            .iter()
            .map(|field| (*field, field.default_column().to_string()))
            .collect();
        Self { columns }
    }
}

impl SchemaRegistry {
    /// Build a registry from the defaults plus `logical key -> column` overrides
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigurationError> {
        let mut registry = Self::default();
        for (key, column) in overrides {
            let field: Field = key.parse()?;
            let column = column.trim();
            if column.is_empty() {
                return Err(ConfigurationError::EmptyColumn(key.clone()));
            }
            registry.columns.insert(field, column.to_string());
        }
        Ok(registry)
    }

    /// Resolve a logical field name to its column name
    pub fn resolve(&self, logical_name: &str) -> Result<&str, ConfigurationError> {
        let field: Field = logical_name.parse()?;
        Ok(self.column(field))
    }

    /// Column name for a typed field
    pub fn column(&self, field: Field) -> &str {
        self.columns
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_column())
    }

    /// Iterate `(field, column)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.columns.iter().map(|(field, column)| (*field, column.as_str()))
    }
}
