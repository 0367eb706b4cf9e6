//! # Transport
//!
//! The raw HTTP capability both API clients are built on.
//!
//! - [`Transport`]: "send verb + url + headers + body, return status + bytes".
//! - [`HttpTransport`]: the production implementation on top of `reqwest`.
//! - [`ApiConnection`]: the invoicing API adapter. It builds URLs, adds the
//!   API key header and turns error responses into [`Error`](crate::framework::Error)s.
//!
//! Tests swap in [`MockTransport`](crate::framework::mock::MockTransport).

pub mod adapter;
pub mod http;

pub use adapter::{ApiConnection, ApiRequest};
pub use http::HttpTransport;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// HTTP verbs used by the clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Full URL, query string already encoded.
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failure below HTTP: DNS, connection, TLS, timeouts, broken bodies.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Sends a single HTTP request.
///
/// Implementations must not interpret the status code; non-2xx responses are
/// returned as `Ok` so callers can read error bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
