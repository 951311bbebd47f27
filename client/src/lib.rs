//! # ALEKS client - placement report retrieval
//!
//! Retrieves student placement exam results from the ALEKS XML-RPC service,
//! one report per class code, and decodes them into typed records.
//!
//! ## Architecture
//!
//! ```text
//!                         ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//!                    ┌───▶│ Fetch (code) │────▶│  XML-RPC    │────▶│  Transport   │
//! ┌──────────────┐   │    │  page 1..n   │     │  codec      │     │ (normalized) │
//! │    Client    │───┼───▶│ Fetch (code) │     └─────────────┘     └──────────────┘
//! │ (validate,   │   │    └──────┬───────┘
//! │  fan out/in) │   └───▶ ...   │ CSV page
//! └──────────────┘               ▼
//!                         ┌──────────────┐     ┌──────────────┐
//!                         │ Page decoder │────▶│Record decoder│
//!                         └──────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aleks::Client;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::from_env().unwrap();
//!     let (report, errors) = client.get_placement_report_from_env().await;
//!     println!("{} records, {} errors", report.len(), errors.len());
//! }
//! ```
//!
//! Records and errors are always returned together: a record that failed
//! to decode in part, a bad page or a failed class code never discards the
//! records retrieved elsewhere.
//!
//! ## Modules
//!
//! - [`error`] - Layered error types
//! - [`models`] - Domain models (PlacementRecord, ReportRequest)
//! - [`parser`] - CSV page and record decoding
//! - [`transport`] - HTTP transport and request/response normalization
//! - [`xmlrpc`] - Minimal XML-RPC codec
//! - [`report`] - Client, request validation, paginated fetch, fan-out/fan-in
//! - [`config`] - `ALEKS_*` environment configuration
//! - [`logs`] - Progress log broadcaster

// Core modules
pub mod error;
pub mod models;

// Decoding
pub mod parser;

// Network
pub mod transport;
pub mod xmlrpc;

// Retrieval
pub mod report;

// Configuration and logging
pub mod config;
pub mod logs;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    DecodeError,
    ErrorList,
    FieldError,
    ReportError,
    RpcError,
    TransportError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{PlacementRecord, PlacementReport, ReportRequest};

// =============================================================================
// Re-exports - Decoding
// =============================================================================

pub use parser::{
    decode_page,
    decode_page_file,
    decode_record,
    validate_headers,
    EXPECTED_HEADERS,
    FIELD_COUNT,
};

// =============================================================================
// Re-exports - Transport
// =============================================================================

pub use transport::{
    HttpRequest,
    HttpResponse,
    NormalizingTransport,
    ReqwestTransport,
    Transport,
};

// =============================================================================
// Re-exports - Retrieval
// =============================================================================

pub use report::{
    fetch_class_code,
    validate_class_codes,
    validate_request,
    validate_request_date,
    Client,
    Credentials,
    FetchParams,
    END_MARKER,
    PLACEMENT_REPORT_METHOD,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ClientConfig, ReportConfig, DEFAULT_URL};
