//! # Mock Framework
//!
//! Utilities for testing clients without a network.
//!
//! [`MockTransport`] is an in-memory [`Transport`]. Queue the answers you want
//! with the fluent expectation API, hand the mock to a client, then inspect the
//! recorded requests and call [`MockTransport::verify`].
//!
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect_get("invoices/7").return_xml("<invoice>...</invoice>");
//!
//! let system = BillingSystem::with_transport(config, Arc::new(mock.clone()));
//! let invoice = system.invoices.find(7).await?;
//!
//! assert_eq!(mock.requests()[0].query_value("format"), Some("xml"));
//! mock.verify(); // every expectation was used
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::xml::XmlElement;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum MockResponse {
    Status { status: u16, body: Vec<u8> },
    TransportError(String),
}

/// One queued request/answer pair.
struct Expectation {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    response: MockResponse,
}

impl Expectation {
    fn matches(&self, request: &RecordedRequest) -> bool {
        self.method == request.method
            && self.path == request.path
            && self
                .query
                .iter()
                .all(|(k, v)| request.query_value(k) == Some(v.as_str()))
    }
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// URL path without the leading `/` and `api/` prefix, e.g. `invoices/7`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Header value, name compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        self.body
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    /// Body parsed as XML, `None` for an empty or unparsable body.
    pub fn body_xml(&self) -> Option<XmlElement> {
        XmlElement::parse(&self.body_text()).ok()
    }
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    requests: Vec<RecordedRequest>,
}

/// In-memory transport with expectation tracking.
///
/// Expectations are consumed in order. A request that does not match the next
/// expectation is answered with a [`TransportError`], so the client under test
/// sees a `RequestFailed` instead of the test hanging or panicking mid-request.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn expect(&self, method: Method, path: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: normalize_path(path),
            query: Vec::new(),
            state: self.state.clone(),
        }
    }

    /// Expects a `GET` on `path` (relative to `/api/`).
    pub fn expect_get(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Get, path)
    }

    pub fn expect_post(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Post, path)
    }

    pub fn expect_put(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Put, path)
    }

    pub fn expect_delete(&self, path: &str) -> ExpectationBuilder {
        self.expect(Method::Delete, path)
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.state();
        if !state.expectations.is_empty() {
            let pending: Vec<String> = state
                .expectations
                .iter()
                .map(|e| format!("{} {}", e.method, e.path))
                .collect();
            panic!(
                "Not all expectations were met. {} remaining: {}",
                pending.len(),
                pending.join(", ")
            );
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let recorded = RecordedRequest {
            method: request.method,
            path: normalize_path(request.url.path()),
            query: request.url.query_pairs().into_owned().collect(),
            headers: request.headers,
            body: request.body,
        };

        let mut state = self.state();
        let matched = state.expectations.front().is_some_and(|next| next.matches(&recorded));
        let expectation = if matched { state.expectations.pop_front() } else { None };
        let description = format!("{} {}", recorded.method, recorded.path);
        state.requests.push(recorded);
        drop(state);

        match expectation.map(|e| e.response) {
            Some(MockResponse::Status { status, body }) => Ok(HttpResponse { status, body }),
            Some(MockResponse::TransportError(message)) => Err(TransportError::Other(message)),
            None => Err(TransportError::Other(format!("Unexpected request: {description}"))),
        }
    }
}

/// Builder for one expectation; finish it with a `return_*` call.
pub struct ExpectationBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    state: Arc<Mutex<MockState>>,
}

impl ExpectationBuilder {
    /// Only matches requests carrying `key=value` in the query string.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Answers `200 OK` with an XML body.
    pub fn return_xml(self, body: &str) {
        self.return_status(200, body);
    }

    /// Answers `200 OK` with raw bytes.
    pub fn return_bytes(self, body: &[u8]) {
        self.push(MockResponse::Status { status: 200, body: body.to_vec() });
    }

    pub fn return_status(self, status: u16, body: &str) {
        self.push(MockResponse::Status { status, body: body.as_bytes().to_vec() });
    }

    /// Fails below HTTP, as a refused connection would.
    pub fn return_transport_error(self, message: &str) {
        self.push(MockResponse::TransportError(message.to_string()));
    }

    fn push(self, response: MockResponse) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.expectations.push_back(Expectation {
            method: self.method,
            path: self.path,
            query: self.query,
            response,
        });
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim_start_matches('/');
    path.strip_prefix("api/").unwrap_or(path).to_string()
}
