//! Domain models for placement report retrieval.
//!
//! - [`PlacementRecord`] - one placement exam attempt
//! - [`PlacementReport`] - the records gathered by one retrieval
//! - [`ReportRequest`] - date range and class codes for one retrieval

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Placement Record
// =============================================================================

/// Result of an individual placement exam.
///
/// The service returns 13 CSV columns per attempt. The fields below follow
/// the same order; the "Start Date"/"Start Time" and "End Date"/"End Time"
/// column pairs are combined into single timestamps.
///
/// Fields that failed to convert hold their zero value (`0`, `0.0`) or `None`
/// for dates, and the failure is reported next to the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub last_login: Option<NaiveDate>,
    pub placement_assessment_number: i64,
    pub total_number_of_placements_taken: i64,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub proctored_assessment: String,
    pub hours_in_placement: f64,
    /// Percentage as written by the service, `62%` is `62.0`.
    pub placement_results: f64,
}

/// Records gathered by one retrieval.
///
/// Records of one class code keep their page and row order; records of
/// different class codes are interleaved in whatever order the fetches
/// finished.
pub type PlacementReport = Vec<PlacementRecord>;

// =============================================================================
// Report Request
// =============================================================================

/// Date range and class codes for one placement report retrieval.
///
/// Dates are kept as the caller wrote them since they are sent to the
/// service verbatim; they are checked against `YYYY-MM-DD` before any call
/// is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub from: String,
    pub to: String,
    pub class_codes: BTreeSet<String>,
}

impl ReportRequest {
    pub fn new<I, S>(from: impl Into<String>, to: impl Into<String>, class_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            to: to.into(),
            class_codes: class_codes.into_iter().map(Into::into).collect(),
        }
    }
}
