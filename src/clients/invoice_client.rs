use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{info, instrument};

use super::filters::{ByInvoice, InvoiceFilter};
use super::resource_client::ResourceClient;
use super::transaction_client::TransactionClient;
use crate::framework::Result;
use crate::model::{Invoice, InvoiceComment, InvoiceItem, InvoicePayment};
use crate::transport::ApiRequest;
use crate::xml::XmlElement;

resource_client!(
    /// Client for invoices.
    Invoice,
    filter = InvoiceFilter
);

impl TransactionClient<Invoice> for InvoiceClient {}

impl InvoiceClient {
    /// The PDF with the account's digital signature applied.
    #[instrument(skip(self))]
    pub async fn signed_pdf(&self, id: i64) -> Result<Vec<u8>> {
        let resource = self.mapper.descriptor()?.resource_name;
        let request = ApiRequest::get(resource)
            .id(id)
            .action("pdf")
            .param("format", "pdf")
            .param("type", "signed");
        self.mapper.connection().send(request).await
    }

    /// Uploads the signed document as a base64 file.
    #[instrument(skip(self, file), fields(bytes = file.len()))]
    pub async fn upload_signature(&self, id: i64, file: &[u8]) -> Result<()> {
        let resource = self.mapper.descriptor()?.resource_name;
        let body = XmlElement::new("signature")
            .child_element(XmlElement::with_text("base64file", STANDARD.encode(file)));
        self.mapper
            .connection()
            .send(ApiRequest::put(resource).id(id).action("upload-signature").body(body))
            .await?;
        info!(id, "Signature uploaded");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn items(&self, id: i64) -> Result<Vec<InvoiceItem>> {
        InvoiceItemClient::from_mapper(self.mapper.sibling())
            .find_all(&ByInvoice { invoice_id: Some(id) })
            .await
    }

    #[instrument(skip(self))]
    pub async fn comments(&self, id: i64) -> Result<Vec<InvoiceComment>> {
        InvoiceCommentClient::from_mapper(self.mapper.sibling())
            .find_all(&ByInvoice { invoice_id: Some(id) })
            .await
    }

    #[instrument(skip(self))]
    pub async fn payments(&self, id: i64) -> Result<Vec<InvoicePayment>> {
        InvoicePaymentClient::from_mapper(self.mapper.sibling())
            .find_all(&ByInvoice { invoice_id: Some(id) })
            .await
    }
}

resource_client!(
    /// Client for invoice positions.
    InvoiceItem,
    filter = ByInvoice
);

resource_client!(
    /// Client for invoice comments. Comments cannot be edited.
    InvoiceComment,
    filter = ByInvoice
);

resource_client!(
    /// Client for payments booked against invoices. Payments cannot be edited.
    InvoicePayment,
    filter = ByInvoice
);

impl InvoicePaymentClient {
    /// Books `payment`, optionally setting the invoice to `PAID`.
    #[instrument(skip(self, payment), fields(invoice_id = payment.invoice_id))]
    pub async fn create_payment(
        &self,
        payment: &mut InvoicePayment,
        mark_invoice_as_paid: bool,
    ) -> Result<InvoicePayment> {
        payment.mark_invoice_as_payed = mark_invoice_as_paid;
        self.create(payment).await
    }
}
