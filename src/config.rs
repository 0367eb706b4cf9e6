//! # Configuration
//!
//! [`ApiConfig`] holds the invoicing account credentials and paging setup.
//! Every setter validates its input and fails with
//! [`Error::InvalidConfiguration`] at assignment time, so a request can never
//! be built from bad credentials.
//!
//! [`HttpConfig`] holds the HTTP transport settings and is deserializable, so it
//! can sit inside an application's own config file.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::framework::{Error, Result};

// Literal patterns; the `expect`s below cannot fire at runtime.
static ACCOUNT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+$").expect("account id pattern is valid"));
static API_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-f0-9]{32}$").expect("api key pattern is valid"));

pub const DEFAULT_DOMAIN: &str = "billomat.net";
pub const DEFAULT_API_KEY_HEADER: &str = "X-ApiKey";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Account settings of the invoicing API.
#[derive(Clone)]
pub struct ApiConfig {
    account_id: String,
    api_key: String,
    use_https: bool,
    domain: String,
    api_key_header: String,
    page_size: u32,
}

impl ApiConfig {
    /// Validated config with default host, header and page size.
    pub fn new(account_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let mut config = Self {
            account_id: String::new(),
            api_key: String::new(),
            use_https: true,
            domain: DEFAULT_DOMAIN.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        };
        config.set_account_id(account_id)?;
        config.set_api_key(api_key)?;
        Ok(config)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Account ids are lower-case alphanumerics; they become the host label.
    pub fn set_account_id(&mut self, account_id: impl Into<String>) -> Result<()> {
        let account_id = account_id.into();
        if !ACCOUNT_ID_PATTERN.is_match(&account_id) {
            return Err(Error::InvalidConfiguration(format!(
                "Account id '{account_id}' must only contain lower-case letters and digits"
            )));
        }
        self.account_id = account_id;
        Ok(())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Accepts 32 hex characters in any case and stores them lower-cased.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<()> {
        let api_key = api_key.into();
        if !API_KEY_PATTERN.is_match(&api_key) {
            return Err(Error::InvalidConfiguration(
                "API key must be 32 hexadecimal characters".to_string(),
            ));
        }
        self.api_key = api_key.to_ascii_lowercase();
        Ok(())
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::InvalidConfiguration(format!(
                "Page size {page_size} is outside 1..={MAX_PAGE_SIZE}"
            )));
        }
        self.page_size = page_size;
        Ok(())
    }

    pub fn use_https(&self) -> bool {
        self.use_https
    }

    pub fn set_use_https(&mut self, use_https: bool) {
        self.use_https = use_https;
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) -> Result<()> {
        let domain = domain.into();
        if domain.is_empty() || domain.contains(['/', ':', ' ']) {
            return Err(Error::InvalidConfiguration(format!("Invalid API domain '{domain}'")));
        }
        self.domain = domain;
        Ok(())
    }

    pub fn api_key_header(&self) -> &str {
        &self.api_key_header
    }

    pub fn set_api_key_header(&mut self, header: impl Into<String>) -> Result<()> {
        let header = header.into();
        if header.is_empty() || !header.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(Error::InvalidConfiguration(format!("Invalid header name '{header}'")));
        }
        self.api_key_header = header;
        Ok(())
    }

    /// `http[s]://{account}.{domain}/api/`
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{scheme}://{}.{}/api/", self.account_id, self.domain)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("account_id", &self.account_id)
            .field("api_key", &"<redacted>")
            .field("use_https", &self.use_https)
            .field("domain", &self.domain)
            .field("api_key_header", &self.api_key_header)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Settings of the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::ErrorKind;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_patterns_compile() {
        assert!(LazyLock::force(&ACCOUNT_ID_PATTERN).is_match("abc123"));
        assert!(LazyLock::force(&API_KEY_PATTERN).is_match(KEY));
    }

    #[test]
    fn test_account_id_validation() {
        let err = ApiConfig::new("ABC123", KEY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

        let mut config = ApiConfig::new("abc123", KEY).unwrap();
        assert_eq!(config.account_id(), "abc123");
        assert!(config.set_account_id("my-shop").is_err());
        assert!(config.set_account_id("").is_err());
        assert_eq!(config.account_id(), "abc123");
    }

    #[test]
    fn test_api_key_validation_and_normalization() {
        let mut config = ApiConfig::new("abc123", KEY).unwrap();

        let err = config.set_api_key(&KEY[..31]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(config.set_api_key("g123456789abcdef0123456789abcdef").is_err());

        config.set_api_key(KEY.to_ascii_uppercase()).unwrap();
        assert_eq!(config.api_key(), KEY);
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = ApiConfig::new("abc123", KEY).unwrap();
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert!(config.set_page_size(0).is_err());
        assert!(config.set_page_size(1001).is_err());
        config.set_page_size(1000).unwrap();
        config.set_page_size(1).unwrap();
        assert_eq!(config.page_size(), 1);
    }

    #[test]
    fn test_base_url_and_redacted_debug() {
        let mut config = ApiConfig::new("acme", KEY).unwrap();
        assert_eq!(config.base_url(), "https://acme.billomat.net/api/");
        config.set_use_https(false);
        config.set_domain("example.org").unwrap();
        assert_eq!(config.base_url(), "http://acme.example.org/api/");

        let printed = format!("{config:?}");
        assert!(!printed.contains(KEY));
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("billing-gateway/"));
    }
}
