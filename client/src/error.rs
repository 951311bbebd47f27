//! Error types for placement report retrieval.
//!
//! Errors are layered the same way the retrieval engine is:
//!
//! - [`FieldError`] - one record field that failed to convert
//! - [`DecodeError`] - one problem found while decoding a CSV page
//! - [`TransportError`] - HTTP exchange failures
//! - [`RpcError`] - XML-RPC encoding/decoding failures and faults
//! - [`ConfigError`] - client or environment configuration problems
//! - [`ReportError`] - top-level entries of an [`ErrorList`]
//!
//! Nothing here aborts a retrieval on its own: the engine collects these
//! into an [`ErrorList`] returned next to the (possibly partial) report.

use thiserror::Error;

// =============================================================================
// Record / Page Decoding Errors
// =============================================================================

/// A single record field that could not be converted to its type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}' (value '{value}'): {message}")]
pub struct FieldError {
    /// Name of the record field.
    pub field: &'static str,
    /// Raw CSV value.
    pub value: String,
    /// Parser message.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, value: impl Into<String>, message: impl ToString) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.to_string(),
        }
    }
}

/// Errors found while decoding one CSV page.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The CSV reader rejected a row.
    #[error("row {row}: invalid CSV: {message}")]
    Csv { row: usize, message: String },

    /// A row did not have the expected number of fields.
    #[error("row {row}: wrong number of fields (expected {expected}, found {found})")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A header column did not carry the expected title.
    #[error("Unexpected header column title ({index}) - expected: {expected}, actual: {actual}")]
    Header {
        index: usize,
        expected: &'static str,
        actual: String,
    },

    /// A data row field failed to convert.
    #[error("row {row}, {source}")]
    Field {
        row: usize,
        #[source]
        source: FieldError,
    },

    /// A saved page could not be read from disk.
    #[error("Failed to read page: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors from an HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be sent or no response was received.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Response body could not be read completely.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Response body is not UTF-8 text.
    #[error("Response body is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

// =============================================================================
// XML-RPC Errors
// =============================================================================

/// Errors from the XML-RPC layer.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The remote method returned a fault.
    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// The response was not a well-formed XML-RPC string response.
    #[error("Malformed XML-RPC response: {0}")]
    Malformed(String),

    /// Underlying HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<quick_xml::Error> for RpcError {
    fn from(err: quick_xml::Error) -> Self {
        RpcError::Malformed(err.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors building a client or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    /// Username and/or password were empty.
    #[error("username and password parameters are both required")]
    MissingCredentials,

    /// The service URL does not parse.
    #[error("Invalid service URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

// =============================================================================
// Report Errors (top-level)
// =============================================================================

/// One entry of an [`ErrorList`].
///
/// Page and transport errors are tagged with the class code and page number
/// they came from so a single list can be diagnosed after the fan-in.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A request date is not `YYYY-MM-DD`.
    #[error("Request date does not match required format YYYY-MM-DD ({field}): {value}")]
    InvalidDate { field: &'static str, value: String },

    /// A class code is not `AAAAA-AAAAA`.
    #[error("Class code does not match required format: {0}")]
    InvalidClassCode(String),

    /// The remote call for a page failed; the class code fetch was aborted.
    #[error("class code {class_code}, page {page}: {source}")]
    Rpc {
        class_code: String,
        page: u32,
        #[source]
        source: RpcError,
    },

    /// A page was fetched but part of it could not be decoded.
    #[error("class code {class_code}, page {page}: {source}")]
    Decode {
        class_code: String,
        page: u32,
        #[source]
        source: DecodeError,
    },

    /// A fetch task ended without producing a result.
    #[error("fetch task failed: {0}")]
    Task(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors collected next to a (possibly partial) placement report.
pub type ErrorList = Vec<ReportError>;

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for XML-RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TransportError -> RpcError
        let transport_err = TransportError::Body("connection reset".into());
        let rpc_err: RpcError = transport_err.into();
        assert!(rpc_err.to_string().contains("connection reset"));

        // ConfigError -> ReportError
        let report_err: ReportError = ConfigError::MissingVar("ALEKS_USERNAME").into();
        assert!(report_err.to_string().contains("ALEKS_USERNAME"));
    }

    #[test]
    fn test_report_error_carries_context() {
        let err = ReportError::Decode {
            class_code: "ABCDE-FGHIJ".into(),
            page: 3,
            source: DecodeError::Field {
                row: 7,
                source: FieldError::new("last_login", "13/45/2019", "input is out of range"),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("ABCDE-FGHIJ"));
        assert!(msg.contains("page 3"));
        assert!(msg.contains("row 7"));
        assert!(msg.contains("last_login"));
        assert!(msg.contains("13/45/2019"));
    }

    #[test]
    fn test_class_code_error_names_value() {
        let err = ReportError::InvalidClassCode("abcde-fghij".into());
        assert_eq!(
            err.to_string(),
            "Class code does not match required format: abcde-fghij"
        );
    }
}
