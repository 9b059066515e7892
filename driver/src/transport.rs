//! The HTTP transport seam.
//!
//! The storage path treats the transport as an external collaborator: a
//! generic synchronous request/response client behind the [`Transport`]
//! trait. Production code uses [`HttpTransport`]; tests script responses
//! through a fake implementation without touching the network.

use crate::error::TransportError;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout for [`HttpTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP methods the remote API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMethod {
    Get,
    Post,
    Patch,
}

impl fmt::Display for WireMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireMethod::Get => write!(f, "GET"),
            WireMethod::Post => write!(f, "POST"),
            WireMethod::Patch => write!(f, "PATCH"),
        }
    }
}

/// One outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: WireMethod,
    /// Fully formed URL including any query string
    pub url: String,
    /// Bearer token attached as `Authorization: Bearer <token>`
    pub bearer: String,
    /// JSON body text, if any
    pub body: Option<String>,
}

/// One raw response, before envelope extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

impl WireResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A synchronous request/response client.
///
/// Implementations block the caller until the round-trip completes; the
/// driver has no internal concurrency.
pub trait Transport: Send + Sync {
    fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}

/// Production transport over a blocking `reqwest` client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport with the default request timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Build a transport with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        let builder = match request.method {
            WireMethod::Get => self.client.get(&request.url),
            WireMethod::Post => self.client.post(&request.url),
            WireMethod::Patch => self.client.patch(&request.url),
        };

        let mut builder = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(&request.bearer);

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(WireResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(WireMethod::Get.to_string(), "GET");
        assert_eq!(WireMethod::Post.to_string(), "POST");
        assert_eq!(WireMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn success_range() {
        let ok = WireResponse {
            status: 204,
            body: String::new(),
        };
        assert!(ok.is_success());

        let not_found = WireResponse {
            status: 404,
            body: String::new(),
        };
        assert!(!not_found.is_success());
    }

    #[test]
    fn builds_with_custom_timeout() {
        assert!(HttpTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
