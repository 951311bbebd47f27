//! Request/response fixes for the ALEKS XML-RPC endpoint.
//!
//! The XML-RPC convention expects `User-Agent` and `Host` headers on every
//! call, and the service wraps string values in CDATA sections that the
//! response decoder is not meant to see.

use reqwest::header::{HeaderValue, ACCEPT, HOST, USER_AGENT};

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::TransportResult;

/// `User-Agent` sent with every call
pub const CLIENT_ID: &str = "aleks-client";

/// Opening marker of a CDATA section
pub const CDATA_OPEN: &str = "<![CDATA[";

/// Closing marker of a CDATA section
pub const CDATA_CLOSE: &str = "]]>";

/// Remove every CDATA open and close marker, keeping the wrapped content.
pub fn strip_cdata(body: &str) -> String {
    body.replace(CDATA_OPEN, "").replace(CDATA_CLOSE, "")
}

/// Wraps a transport, setting the headers the service expects and
/// stripping CDATA markers from response bodies.
#[derive(Debug, Clone)]
pub struct NormalizingTransport<T> {
    inner: T,
}

impl<T: Transport> NormalizingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for NormalizingTransport<T> {
    async fn round_trip(&self, mut request: HttpRequest) -> TransportResult<HttpResponse> {
        request.headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        request
            .headers
            .insert(USER_AGENT, HeaderValue::from_static(CLIENT_ID));
        if let Some(host) = request
            .url
            .host_str()
            .and_then(|h| HeaderValue::from_str(h).ok())
        {
            request.headers.insert(HOST, host);
        }

        let response = self.inner.round_trip(request).await?;

        let body = String::from_utf8(response.body)?;
        Ok(HttpResponse {
            status: response.status,
            body: strip_cdata(&body).into_bytes(),
        })
    }
}
