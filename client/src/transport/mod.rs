//! HTTP transport used by the XML-RPC layer.
//!
//! [`Transport`] is the only network capability the retrieval engine needs:
//! send one request, receive one fully-read response. [`ReqwestTransport`]
//! is the real implementation; [`NormalizingTransport`] wraps any transport
//! with the header and body fixes the ALEKS service requires. Tests swap in
//! in-memory transports.

pub mod normalize;

use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use std::future::Future;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult, TransportError, TransportResult};

pub use normalize::{strip_cdata, NormalizingTransport, CDATA_CLOSE, CDATA_OPEN, CLIENT_ID};

/// Dial timeout (also bounds the TLS handshake, see [`ReqwestTransport::new`])
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Idle pooled connections are closed after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum idle pooled connections per host
const MAX_IDLE_CONNECTIONS: usize = 100;

/// An outbound XML-RPC HTTP request (always POSTed).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Send a request, receive a response.
///
/// Implementations must be shareable across fetch tasks.
pub trait Transport: Send + Sync {
    fn round_trip(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = TransportResult<HttpResponse>> + Send;
}

/// Transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the client used to reach the service.
    ///
    /// Response compression is disabled since the XML-RPC responses are
    /// decoded from the raw body. `reqwest` has no separate TLS handshake
    /// timeout: the connect timeout covers dialing and the handshake.
    pub fn new() -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(KEEP_ALIVE)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .no_gzip()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn round_trip(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let response = self
            .client
            .post(request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
