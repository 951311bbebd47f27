//! Placement report retrieval.
//!
//! [`Client::get_placement_report`] validates a [`ReportRequest`], then runs
//! one [`fetch_class_code`] task per class code concurrently and gathers
//! every task's records and errors into one report and one error list.
//!
//! # Example
//!
//! ```rust,ignore
//! use aleks::{Client, ReportRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(None, "username", "password")?;
//!     let request = ReportRequest::new("2019-10-01", "2019-10-31", ["ABCDE-FGHIJ"]);
//!
//!     let (report, errors) = client.get_placement_report(&request).await;
//!     println!("{} records, {} errors", report.len(), errors.len());
//!     Ok(())
//! }
//! ```

pub mod fetch;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::{ClientConfig, ReportConfig, DEFAULT_URL};
use crate::error::{ConfigError, ConfigResult, ErrorList, ReportError};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::{PlacementReport, ReportRequest};
use crate::transport::{NormalizingTransport, ReqwestTransport, Transport};

pub use fetch::{fetch_class_code, FetchParams, END_MARKER, PLACEMENT_REPORT_METHOD};

/// Calendar format of request dates (`YYYY-MM-DD`)
pub const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d";

static REQUEST_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid request date pattern"));

static CLASS_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}-[A-Z]{5}$").expect("valid class code pattern"));

// =============================================================================
// Request Validation
// =============================================================================

/// Check one request date, naming the offending value on failure.
pub fn validate_request_date(field: &'static str, value: &str) -> Option<ReportError> {
    let valid = REQUEST_DATE_RE.is_match(value)
        && NaiveDate::parse_from_str(value, REQUEST_DATE_FORMAT).is_ok();
    (!valid).then(|| ReportError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// One error per class code not shaped `AAAAA-AAAAA`.
pub fn validate_class_codes<'a, I>(class_codes: I) -> ErrorList
where
    I: IntoIterator<Item = &'a String>,
{
    class_codes
        .into_iter()
        .filter(|code| !CLASS_CODE_RE.is_match(code))
        .map(|code| ReportError::InvalidClassCode(code.clone()))
        .collect()
}

/// Every validation error of a request, dates first.
pub fn validate_request(request: &ReportRequest) -> ErrorList {
    let mut errors: ErrorList = [
        validate_request_date("from", &request.from),
        validate_request_date("to", &request.to),
    ]
    .into_iter()
    .flatten()
    .collect();
    errors.extend(validate_class_codes(&request.class_codes));
    errors
}

// =============================================================================
// Client
// =============================================================================

/// Username and password sent with every call.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// ALEKS XML-RPC client.
#[derive(Debug)]
pub struct Client<T = NormalizingTransport<ReqwestTransport>> {
    url: Url,
    credentials: Credentials,
    transport: Arc<T>,
}

impl Client {
    /// Create a client for `url` (or [`DEFAULT_URL`]) over HTTPS.
    pub fn new(url: Option<&str>, username: &str, password: &str) -> ConfigResult<Self> {
        let transport = NormalizingTransport::new(ReqwestTransport::new()?);
        Client::with_transport(url, username, password, transport)
    }

    /// Create a client from `ALEKS_URL`, `ALEKS_USERNAME` and `ALEKS_PASSWORD`.
    pub fn from_env() -> ConfigResult<Self> {
        let cfg = ClientConfig::from_env()?;
        Client::new(cfg.url.as_deref(), &cfg.username, &cfg.password)
    }
}

impl<T: Transport + 'static> Client<T> {
    /// Create a client over any transport.
    pub fn with_transport(
        url: Option<&str>,
        username: &str,
        password: &str,
        transport: T,
    ) -> ConfigResult<Self> {
        let url = url.filter(|u| !u.is_empty()).unwrap_or(DEFAULT_URL);
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if username.is_empty() || password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(Self {
            url,
            credentials: Credentials {
                username: username.to_string(),
                password: password.to_string(),
            },
            transport: Arc::new(transport),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retrieve the placement report for every class code of `request`.
    ///
    /// An invalid request returns an empty report with every validation
    /// error and makes no call. Otherwise one task per class code fetches
    /// concurrently; a failing class code never prevents the others'
    /// records from being returned. Records of one class code keep their
    /// page and row order, records of different class codes come in
    /// whatever order the tasks finish.
    ///
    /// Requesting many class codes starts as many concurrent fetches.
    pub async fn get_placement_report(&self, request: &ReportRequest) -> (PlacementReport, ErrorList) {
        let mut errors = validate_request(request);
        if !errors.is_empty() {
            log_error(format!("Invalid report request ({} errors)", errors.len()));
            return (PlacementReport::new(), errors);
        }

        log_info(format!(
            "📡 Requesting placement report {} to {} for {} class code(s)",
            request.from,
            request.to,
            request.class_codes.len()
        ));

        // Scatter
        let mut tasks = JoinSet::new();
        for class_code in &request.class_codes {
            let params = FetchParams {
                username: self.credentials.username.clone(),
                password: self.credentials.password.clone(),
                from: request.from.clone(),
                to: request.to.clone(),
                class_code: class_code.clone(),
            };
            let transport = Arc::clone(&self.transport);
            let url = self.url.clone();
            tasks.spawn(async move { fetch_class_code(transport.as_ref(), &url, &params).await });
        }

        // Gather
        let mut report = PlacementReport::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((records, task_errors)) => {
                    report.extend(records);
                    errors.extend(task_errors);
                }
                Err(e) => {
                    log_error(format!("Fetch task failed: {}", e));
                    errors.push(ReportError::Task(e.to_string()));
                }
            }
        }

        if errors.is_empty() {
            log_success(format!("{} placement records", report.len()));
        } else {
            log_warning(format!(
                "{} placement records, {} errors",
                report.len(),
                errors.len()
            ));
        }

        (report, errors)
    }

    /// Retrieve the report described by `ALEKS_FROM_COMPLETION_DATE`,
    /// `ALEKS_TO_COMPLETION_DATE` and `ALEKS_CLASSCODES`.
    ///
    /// A configuration problem is returned as the only entry of the error
    /// list.
    pub async fn get_placement_report_from_env(&self) -> (PlacementReport, ErrorList) {
        match ReportConfig::from_env() {
            Ok(cfg) => self.get_placement_report(&cfg.into_request()).await,
            Err(e) => (PlacementReport::new(), vec![e.into()]),
        }
    }
}
