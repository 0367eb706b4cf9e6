use serde::Deserialize;

use super::error::{GatewayError, GatewayResult};

/// Test endpoint of the processing gateway.
pub const DEFAULT_PROCESSING_URL: &str = "https://c3-test.wirecard.com/secure/ssl-gateway";

/// Credentials for the processing gateway and the QPay payment page.
///
/// Each half is checked only when it is used: processing requests need the
/// username and password, checkouts need the customer id and secret.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub username: String,
    pub password: String,
    /// Default business case signature for new jobs.
    pub business_case_signature: Option<String>,
    pub processing_url: String,
    pub customer_id: String,
    pub customer_secret: String,
    pub shop_id: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            business_case_signature: None,
            processing_url: DEFAULT_PROCESSING_URL.to_string(),
            customer_id: String::new(),
            customer_secret: String::new(),
            shop_id: None,
        }
    }
}

impl GatewayConfig {
    /// Public QPay demo account. Checkouts against it never charge anyone.
    pub fn demo() -> Self {
        Self {
            customer_id: "D200001".to_string(),
            customer_secret: "B8AKTPWBRMNBV455FG6M2DANE99WU2".to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn require_processing(&self) -> GatewayResult<()> {
        if self.username.is_empty() {
            return Err(GatewayError::MissingCredentials("processing username"));
        }
        if self.password.is_empty() {
            return Err(GatewayError::MissingCredentials("processing password"));
        }
        Ok(())
    }

    pub(crate) fn require_qpay(&self) -> GatewayResult<()> {
        if self.customer_id.is_empty() {
            return Err(GatewayError::MissingCredentials("QPay customer id"));
        }
        if self.customer_secret.is_empty() {
            return Err(GatewayError::MissingCredentials("QPay customer secret"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("business_case_signature", &self.business_case_signature)
            .field("processing_url", &self.processing_url)
            .field("customer_id", &self.customer_id)
            .field("customer_secret", &"<redacted>")
            .field("shop_id", &self.shop_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_test_gateway() {
        let config = GatewayConfig::default();
        assert_eq!(config.processing_url, DEFAULT_PROCESSING_URL);
        assert!(matches!(
            config.require_processing(),
            Err(GatewayError::MissingCredentials("processing username"))
        ));
        assert!(config.require_qpay().is_err());
    }

    #[test]
    fn test_demo_account_allows_checkout_only() {
        let config = GatewayConfig::demo();
        assert!(config.require_qpay().is_ok());
        assert!(config.require_processing().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = GatewayConfig {
            password: "hunter2".into(),
            ..GatewayConfig::demo()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("B8AKTPWBRMNBV455FG6M2DANE99WU2"));
    }
}
