//! # Invoicing API Adapter
//!
//! [`ApiConnection`] turns an [`ApiRequest`] (verb, resource path, query
//! parameters, XML body) into an [`HttpRequest`], sends it through the injected
//! [`Transport`] and maps the answer:
//!
//! | Answer                     | Result                                   |
//! |----------------------------|------------------------------------------|
//! | 2xx                        | body bytes                               |
//! | 401                        | [`Error::Unauthorized`]                  |
//! | 404                        | [`Error::NotFound`]                      |
//! | other status               | [`Error::RequestFailed`] with the status |
//! | no answer (DNS, TLS, ...)  | [`Error::RequestFailed`] without status  |
//!
//! Error statuses carry the text of the `<errors><error>..</error></errors>`
//! envelope when the body has one.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use super::{HttpRequest, Method, Transport};
use crate::config::ApiConfig;
use crate::framework::error::HttpStatusError;
use crate::framework::{Error, Result};
use crate::xml::XmlElement;

const XML_CONTENT_TYPE: &str = "application/xml";

/// One call against the invoicing API, relative to `/api/`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    params: Vec<(String, String)>,
    body: Option<XmlElement>,
}

impl ApiRequest {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            segments: vec![resource.into()],
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Method::Get, resource)
    }

    pub fn post(resource: impl Into<String>) -> Self {
        Self::new(Method::Post, resource)
    }

    pub fn put(resource: impl Into<String>) -> Self {
        Self::new(Method::Put, resource)
    }

    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(Method::Delete, resource)
    }

    /// Appends `/{id}`.
    pub fn id(mut self, id: i64) -> Self {
        self.segments.push(id.to_string());
        self
    }

    /// Appends a method segment such as `pdf` or `complete`.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.segments.push(action.into());
        self
    }

    /// Adds a query parameter. `format` replaces the default `xml`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn body(mut self, body: XmlElement) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path below `/api/`, e.g. `invoices/7/pdf`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// Connection to one invoicing account.
///
/// Cheap to share: clients hold it in an `Arc` and never mutate it.
#[derive(Clone)]
pub struct ApiConnection {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
}

impl ApiConnection {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Full URL of `request`, `format=xml` unless the request overrides it.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let raw = format!("{}{}", self.config.base_url(), request.path());
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::InvalidConfiguration(format!("Cannot build URL '{raw}': {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            if !request.params.iter().any(|(k, _)| k == "format") {
                query.append_pair("format", "xml");
            }
            for (key, value) in &request.params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends `request` and returns the raw body of a 2xx answer.
    pub async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let url = self.url_for(&request)?;
        let body = match &request.body {
            Some(element) => Some(
                element
                    .to_document()
                    .map_err(|e| Error::request_failed("Could not serialize request!", e))?
                    .into_bytes(),
            ),
            None => None,
        };

        let http_request = HttpRequest {
            method: request.method,
            url,
            headers: vec![
                (self.config.api_key_header().to_string(), self.config.api_key().to_string()),
                ("Accept".to_string(), XML_CONTENT_TYPE.to_string()),
                ("Content-Type".to_string(), XML_CONTENT_TYPE.to_string()),
            ],
            body,
        };

        debug!(method = %request.method, path = %request.path(), "Sending API request");
        let response = self
            .transport
            .send(http_request)
            .await
            .map_err(|e| Error::request_failed(format!("Request to '{}' failed", request.path()), e))?;

        if response.is_success() {
            return Ok(response.body);
        }

        let body = response.body_text();
        warn!(method = %request.method, path = %request.path(), status = response.status, "API request rejected");
        Err(status_error(response.status, body))
    }

    /// Sends `request` and parses the answer as an XML document.
    pub async fn send_xml(&self, request: ApiRequest) -> Result<XmlElement> {
        let bytes = self.send(request).await?;
        parse_body(&bytes)
    }
}

impl std::fmt::Debug for ApiConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConnection").field("config", &self.config).finish_non_exhaustive()
    }
}

fn parse_body(bytes: &[u8]) -> Result<XmlElement> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::request_failed("Could not parse response!", e))?;
    XmlElement::parse(text).map_err(|e| Error::request_failed("Could not parse response!", e))
}

/// Text of an `<errors><error>..</error></errors>` envelope, if `body` is one.
fn envelope_message(body: &str) -> Option<String> {
    let root = XmlElement::parse(body).ok()?;
    if root.name() != "errors" {
        return None;
    }
    let messages: Vec<&str> = root
        .children_named("error")
        .map(|e| e.text().trim())
        .filter(|m| !m.is_empty())
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

fn status_error(status: u16, body: String) -> Error {
    let message = envelope_message(&body);
    match status {
        401 => Error::Unauthorized(message.unwrap_or_else(|| "Not authorized to access this resource!".to_string())),
        404 => Error::NotFound(message.unwrap_or_else(|| "Resource not found!".to_string())),
        _ => Error::RequestFailed {
            message: message.unwrap_or_else(|| format!("Request failed (HTTP {status})")),
            status: Some(status),
            source: Box::new(HttpStatusError { status, body }),
        },
    }
}
