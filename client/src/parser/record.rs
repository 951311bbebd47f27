//! Record decoder: one 13-field CSV row to a [`PlacementRecord`].

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FieldError;
use crate::models::PlacementRecord;

/// Number of columns in a placement report row.
pub const FIELD_COUNT: usize = 13;

/// Format of the "Last login" column.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Format of a "Start/End Date" column joined to its "Start/End Time" column.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M %p";

// chrono accepts single digit fields, padding spaces and lowercase am/pm;
// the report columns are always zero padded and uppercase.
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date pattern"));

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}/\d{2}/\d{4} \d{2}:\d{2} (AM|PM)$").expect("valid timestamp pattern")
});

/// Collects field errors for one record.
///
/// Every conversion returns the zero value of its type on failure so all
/// fields are attempted regardless of earlier failures.
#[derive(Debug, Default)]
struct FieldCollector {
    errors: Vec<FieldError>,
}

impl FieldCollector {
    fn date(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        if !DATE_RE.is_match(value) {
            self.errors.push(FieldError::new(field, value, "expected MM/DD/YYYY"));
            return None;
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| self.errors.push(FieldError::new(field, value, e)))
            .ok()
    }

    fn timestamp(&mut self, field: &'static str, date: &str, time: &str) -> Option<NaiveDateTime> {
        let value = format!("{} {}", date, time);
        if !TIMESTAMP_RE.is_match(&value) {
            self.errors.push(FieldError::new(field, value, "expected MM/DD/YYYY hh:mm AM/PM"));
            return None;
        }
        NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
            .map_err(|e| self.errors.push(FieldError::new(field, value.as_str(), e)))
            .ok()
    }

    fn int(&mut self, field: &'static str, value: &str) -> i64 {
        value.parse::<i64>().unwrap_or_else(|e| {
            self.errors.push(FieldError::new(field, value, e));
            0
        })
    }

    fn float(&mut self, field: &'static str, value: &str) -> f64 {
        value.parse::<f64>().unwrap_or_else(|e| {
            self.errors.push(FieldError::new(field, value, e));
            0.0
        })
    }

    fn percentage(&mut self, field: &'static str, value: &str) -> f64 {
        let stripped = value.replace('%', "");
        stripped.parse::<f64>().unwrap_or_else(|e| {
            self.errors.push(FieldError::new(field, value, e));
            0.0
        })
    }
}

/// Decode one placement report row.
///
/// Never fails as a whole: the record is always returned, with every field
/// that could not be converted left at its zero value and reported in the
/// error list (one error per failed field).
pub fn decode_record(fields: &[&str; FIELD_COUNT]) -> (PlacementRecord, Vec<FieldError>) {
    let mut c = FieldCollector::default();

    let record = PlacementRecord {
        name: fields[0].to_string(),
        student_id: fields[1].to_string(),
        email: fields[2].to_string(),
        last_login: c.date("last_login", fields[3]),
        placement_assessment_number: c.int("placement_assessment_number", fields[4]),
        total_number_of_placements_taken: c.int("total_number_of_placements_taken", fields[5]),
        start_time: c.timestamp("start_time", fields[6], fields[7]),
        end_time: c.timestamp("end_time", fields[8], fields[9]),
        proctored_assessment: fields[10].to_string(),
        hours_in_placement: c.float("hours_in_placement", fields[11]),
        placement_results: c.percentage("placement_results", fields[12]),
    };

    (record, c.errors)
}
