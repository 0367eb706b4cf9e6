use std::sync::Arc;

use tracing::info;

use crate::clients::{
    ArticleClient, CustomerClient, InvoiceClient, InvoiceCommentClient, InvoiceItemClient,
    InvoicePaymentClient, OfferClient, OfferCommentClient, OfferItemClient, SettingsClient,
    TemplateClient, UnitClient, UserClient,
};
use crate::config::{ApiConfig, HttpConfig};
use crate::framework::{Error, Result};
use crate::transport::{ApiConnection, HttpTransport, Transport};

/// Every typed client of one invoicing account.
///
/// `BillingSystem` is responsible for:
/// - **Dependency Wiring**: all clients share one [`ApiConnection`], so they
///   use the same credentials, page size and transport
/// - **Transport Selection**: production code uses [`HttpTransport`], tests
///   inject a [`MockTransport`](crate::framework::mock::MockTransport)
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::new("mycompany", "0123456789abcdef0123456789abcdef")?;
/// let system = BillingSystem::new(config)?;
///
/// let mut invoice = Invoice::new(customer_id);
/// system.invoices.create(&mut invoice).await?;
/// system.invoices.complete(invoice.id(), None).await?;
/// let pdf = system.invoices.pdf(invoice.id()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BillingSystem {
    pub invoices: InvoiceClient,
    pub invoice_items: InvoiceItemClient,
    pub invoice_comments: InvoiceCommentClient,
    pub invoice_payments: InvoicePaymentClient,

    pub offers: OfferClient,
    pub offer_items: OfferItemClient,
    pub offer_comments: OfferCommentClient,

    pub customers: CustomerClient,
    pub articles: ArticleClient,
    pub units: UnitClient,

    pub users: UserClient,
    pub settings: SettingsClient,
    pub templates: TemplateClient,

    connection: Arc<ApiConnection>,
}

impl BillingSystem {
    /// Clients over a real HTTP transport with default timeouts.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_http_config(config, &HttpConfig::default())
    }

    pub fn with_http_config(config: ApiConfig, http: &HttpConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(http)
            .map_err(|e| Error::request_failed("Could not build HTTP client", e))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Clients over any [`Transport`].
    pub fn with_transport(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        info!(account = config.account_id(), "Connecting clients");
        let connection = Arc::new(ApiConnection::new(config, transport));

        Self {
            invoices: InvoiceClient::new(connection.clone()),
            invoice_items: InvoiceItemClient::new(connection.clone()),
            invoice_comments: InvoiceCommentClient::new(connection.clone()),
            invoice_payments: InvoicePaymentClient::new(connection.clone()),
            offers: OfferClient::new(connection.clone()),
            offer_items: OfferItemClient::new(connection.clone()),
            offer_comments: OfferCommentClient::new(connection.clone()),
            customers: CustomerClient::new(connection.clone()),
            articles: ArticleClient::new(connection.clone()),
            units: UnitClient::new(connection.clone()),
            users: UserClient::new(connection.clone()),
            settings: SettingsClient::new(connection.clone()),
            templates: TemplateClient::new(connection.clone()),
            connection,
        }
    }

    pub fn connection(&self) -> &Arc<ApiConnection> {
        &self.connection
    }
}
