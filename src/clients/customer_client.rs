use tracing::instrument;

use super::filters::{CustomerFilter, InvoiceFilter, OfferFilter};
use super::resource_client::ResourceClient;
use crate::framework::Result;
use crate::model::{Customer, Invoice, Offer};

resource_client!(
    /// Client for customers (`clients` resource).
    Customer,
    filter = CustomerFilter
);

impl CustomerClient {
    /// Every invoice addressed to the customer.
    #[instrument(skip(self))]
    pub async fn invoices(&self, customer_id: i64) -> Result<Vec<Invoice>> {
        let params = InvoiceFilter::client(customer_id);
        super::InvoiceClient::from_mapper(self.mapper.sibling::<Invoice>())
            .find_all(&params)
            .await
    }

    /// Every offer addressed to the customer.
    #[instrument(skip(self))]
    pub async fn offers(&self, customer_id: i64) -> Result<Vec<Offer>> {
        let params = OfferFilter::client(customer_id);
        super::OfferClient::from_mapper(self.mapper.sibling::<Offer>())
            .find_all(&params)
            .await
    }
}
