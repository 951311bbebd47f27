//! Paginated fetcher: all pages of the placement report for one class code.

use reqwest::Url;

use crate::error::{ErrorList, ReportError};
use crate::logs::{log_debug, log_error, log_info_indent};
use crate::models::PlacementReport;
use crate::parser::decode_page;
use crate::transport::Transport;
use crate::xmlrpc;

/// Name of the remote XML-RPC method
pub const PLACEMENT_REPORT_METHOD: &str = "getPlacementReport";

/// Page content returned once a class code has no further records
pub const END_MARKER: &str = "No records found";

/// Characters trimmed from both ends of a page before it is inspected
const PAGE_TRIM: [char; 3] = [' ', '\t', '\n'];

/// Parameters for one class code's fetch.
///
/// Every fetch task owns its own copy; only the page number changes between
/// calls.
#[derive(Clone)]
pub struct FetchParams {
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
    pub class_code: String,
}

impl std::fmt::Debug for FetchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchParams")
            .field("username", &self.username)
            .field("password", &"********")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("class_code", &self.class_code)
            .finish()
    }
}

impl FetchParams {
    /// XML-RPC struct members for one page request.
    pub fn members(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("password", self.password.clone()),
            ("from_completion_date", self.from.clone()),
            ("to_completion_date", self.to.clone()),
            ("class_code", self.class_code.clone()),
            ("page_num", page.to_string()),
        ]
    }
}

/// Fetch every page for one class code, starting at page 1.
///
/// Pages are requested one at a time until the service answers with
/// [`END_MARKER`]. A failed call ends the fetch at once: records gathered
/// from earlier pages are kept and the failure is appended to the errors.
/// Decode errors never end the fetch.
///
/// There is no page limit: a service that never answers with the end marker
/// keeps this loop running.
pub async fn fetch_class_code<T: Transport>(
    transport: &T,
    url: &Url,
    params: &FetchParams,
) -> (PlacementReport, ErrorList) {
    let mut report = PlacementReport::new();
    let mut errors = ErrorList::new();

    for page in 1u32.. {
        log_info_indent(format!("{}: requesting page {}", params.class_code, page), 1);

        let data = match xmlrpc::call(transport, url, PLACEMENT_REPORT_METHOD, &params.members(page)).await {
            Ok(data) => data,
            Err(source) => {
                log_error(format!("{}: page {} failed: {}", params.class_code, page, source));
                errors.push(ReportError::Rpc {
                    class_code: params.class_code.clone(),
                    page,
                    source,
                });
                return (report, errors);
            }
        };

        let data = data.trim_matches(&PAGE_TRIM[..]);
        if data == END_MARKER {
            break;
        }
        log_debug(format!("Page data: {}", data));

        let (records, page_errors) = decode_page(data);
        log_info_indent(
            format!(
                "{}: page {} decoded ({} records, {} errors)",
                params.class_code,
                page,
                records.len(),
                page_errors.len()
            ),
            1,
        );
        report.extend(records);
        errors.extend(page_errors.into_iter().map(|source| ReportError::Decode {
            class_code: params.class_code.clone(),
            page,
            source,
        }));
    }

    (report, errors)
}
