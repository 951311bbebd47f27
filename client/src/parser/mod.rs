//! Page decoder: one CSV page of the placement report to typed records.
//!
//! A page is a CSV document with a header row followed by data rows, 13
//! columns each. Decoding never stops early: a bad header, a row with the
//! wrong number of fields or a field that fails to convert is reported and
//! the remaining rows are still decoded.

pub mod record;

use std::path::Path;

use crate::error::DecodeError;
use crate::logs::log_debug;
use crate::models::PlacementRecord;

pub use record::{decode_record, DATE_FORMAT, FIELD_COUNT, TIMESTAMP_FORMAT};

/// Column titles expected in the header row, in order.
pub const EXPECTED_HEADERS: [&str; FIELD_COUNT] = [
    "Name",
    "Student Id",
    "Email",
    "Last login",
    "Placement Assessment Number",
    "Total Number of Placements Taken",
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "Proctored Assessment",
    "Time in Placement (in hours)",
    "Placement Results %",
];

/// Compare a header row with [`EXPECTED_HEADERS`], one error per mismatch.
pub fn validate_headers(headers: &[&str; FIELD_COUNT]) -> Vec<DecodeError> {
    headers
        .iter()
        .zip(EXPECTED_HEADERS.iter())
        .enumerate()
        .filter(|(_, (actual, expected))| actual != expected)
        .map(|(index, (actual, expected))| DecodeError::Header {
            index,
            expected: *expected,
            actual: actual.to_string(),
        })
        .collect()
}

/// Decode one CSV page.
///
/// The first row is treated as the header whatever its content. Rows are
/// numbered from 1 (the header) in error messages.
///
/// # Example
/// ```ignore
/// use aleks::decode_page;
///
/// let (records, errors) = decode_page(page);
/// println!("{} records, {} errors", records.len(), errors.len());
/// ```
pub fn decode_page(data: &str) -> (Vec<PlacementRecord>, Vec<DecodeError>) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;

        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                errors.push(DecodeError::Csv {
                    row,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if rec.len() != FIELD_COUNT {
            errors.push(DecodeError::FieldCount {
                row,
                expected: FIELD_COUNT,
                found: rec.len(),
            });
            continue;
        }

        let fields: [&str; FIELD_COUNT] = std::array::from_fn(|i| &rec[i]);

        if idx == 0 {
            errors.extend(validate_headers(&fields));
            continue;
        }

        let (record, field_errors) = decode_record(&fields);
        log_debug(format!("Placement record: {:?}", record));
        errors.extend(
            field_errors
                .into_iter()
                .map(|source| DecodeError::Field { row, source }),
        );
        records.push(record);
    }

    (records, errors)
}

/// Decode a CSV page saved to disk.
///
/// Surrounding whitespace is trimmed the same way fetched pages are.
pub fn decode_page_file<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<PlacementRecord>, Vec<DecodeError>), DecodeError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(decode_page(content.trim_matches(|c| c == ' ' || c == '\t' || c == '\n')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    const HEADER: &str = r#""Name","Student Id","Email","Last login","Placement Assessment Number","Total Number of Placements Taken","Start Date","Start Time","End Date","End Time","Proctored Assessment","Time in Placement (in hours)","Placement Results %""#;

    const DOE: &str = r#""Doe, John","912345678","JQD5678@EXAMPLE.EDU","03/06/2016","1","1","03/06/2016","01:42 PM","03/06/2016","03:23 PM","No/Complete","1.7","62%""#;

    const ROE: &str = r#""Roe, Jane","912345679","JXR1234@EXAMPLE.EDU","03/07/2016","2","2","03/07/2016","09:05 AM","03/07/2016","10:15 AM","Yes/Complete","1.2","88%""#;

    fn page(rows: &[&str]) -> String {
        let mut lines = vec![HEADER];
        lines.extend_from_slice(rows);
        lines.join("\n")
    }

    #[test]
    fn test_single_record_page() {
        let (records, errors) = decode_page(&page(&[DOE]));

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Doe, John");
        assert_eq!(records[0].placement_results, 62.0);
        assert_eq!(records[0].hours_in_placement, 1.7);
        assert_eq!(
            records[0].start_time,
            NaiveDate::from_ymd_opt(2016, 3, 6).and_then(|d| d.and_hms_opt(13, 42, 0))
        );
    }

    #[test]
    fn test_rows_keep_order() {
        let (records, errors) = decode_page(&page(&[DOE, ROE]));
        assert!(errors.is_empty());
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Doe, John", "Roe, Jane"]);
    }

    #[test]
    fn test_header_mismatch_is_not_fatal() {
        let header = HEADER
            .replace("\"Email\"", "\"E-mail\"")
            .replace("\"End Time\"", "\"Finish Time\"");
        let data = format!("{}\n{}", header, DOE);

        let (records, errors) = decode_page(&data);

        assert_eq!(records.len(), 1);
        assert_eq!(errors.len(), 2);
        match &errors[0] {
            DecodeError::Header { index, expected, actual } => {
                assert_eq!(*index, 2);
                assert_eq!(*expected, "Email");
                assert_eq!(actual, "E-mail");
            }
            other => panic!("expected header error, got {:?}", other),
        }
        let msg = errors[1].to_string();
        assert!(msg.contains("(9)"));
        assert!(msg.contains("expected: End Time"));
        assert!(msg.contains("actual: Finish Time"));
    }

    #[test]
    fn test_wrong_field_count_skips_row_only() {
        let short = r#""Short","1","2""#;
        let long = format!("{},\"extra\"", ROE);
        let (records, errors) = decode_page(&page(&[short, DOE, long.as_str(), ROE]));

        assert_eq!(records.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            DecodeError::FieldCount { row: 2, expected: 13, found: 3 }
        ));
        assert!(matches!(
            errors[1],
            DecodeError::FieldCount { row: 4, expected: 13, found: 14 }
        ));
    }

    #[test]
    fn test_field_errors_keep_record() {
        let bad = DOE.replace("\"1.7\"", "\"n/a\"");
        let (records, errors) = decode_page(&page(&[bad.as_str(), ROE]));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hours_in_placement, 0.0);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            DecodeError::Field { row, source } => {
                assert_eq!(*row, 2);
                assert_eq!(source.field, "hours_in_placement");
                assert_eq!(source.value, "n/a");
            }
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_page() {
        let (records, errors) = decode_page(HEADER);
        assert!(records.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_headers_exact() {
        assert!(validate_headers(&EXPECTED_HEADERS).is_empty());
    }

    #[test]
    fn test_decode_page_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\n{}\n{}\n", HEADER, DOE).unwrap();

        let (records, errors) = decode_page_file(file.path()).unwrap();
        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "JQD5678@EXAMPLE.EDU");
    }

    #[test]
    fn test_decode_page_file_missing() {
        let result = decode_page_file("/nonexistent/page.csv");
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }
}
