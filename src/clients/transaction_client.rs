use async_trait::async_trait;
use tracing::info;

use super::resource_client::ResourceClient;
use crate::framework::{Resource, Result};
use crate::model::{Customer, EmailMessage, Invoice, Offer, TransactionFields};
use crate::transport::ApiRequest;
use crate::xml::XmlElement;

/// Resources with the shared transaction fields.
pub trait Transaction: Resource {
    fn transaction(&self) -> &TransactionFields;
}

impl Transaction for Invoice {
    fn transaction(&self) -> &TransactionFields {
        &self.transaction
    }
}

impl Transaction for Offer {
    fn transaction(&self) -> &TransactionFields {
        &self.transaction
    }
}

/// Document actions shared by invoices and offers.
///
/// All actions address the document by id under the resource's own path,
/// e.g. `invoices/{id}/complete`.
#[async_trait]
pub trait TransactionClient<T: Transaction>: ResourceClient<T> {
    /// The rendered PDF document.
    #[tracing::instrument(skip(self))]
    async fn pdf(&self, id: i64) -> Result<Vec<u8>> {
        let resource = self.inner().descriptor()?.resource_name;
        let request = ApiRequest::get(resource).id(id).action("pdf").param("format", "pdf");
        self.inner().connection().send(request).await
    }

    /// Finalizes a draft: assigns its number and renders it, optionally with
    /// a specific template.
    #[tracing::instrument(skip(self))]
    async fn complete(&self, id: i64, template_id: Option<i64>) -> Result<()> {
        let resource = self.inner().descriptor()?.resource_name;
        let mut body = XmlElement::new("complete");
        if let Some(template_id) = template_id {
            body.push(XmlElement::with_text("template_id", template_id.to_string()));
        }
        self.inner()
            .connection()
            .send(ApiRequest::put(resource).id(id).action("complete").body(body))
            .await?;
        info!(resource, id, "Completed");
        Ok(())
    }

    /// Mails the document. Fails with `InvalidArgument` before any request
    /// when `message` has no `to` recipient.
    #[tracing::instrument(skip(self, message))]
    async fn send_mail(&self, id: i64, message: &EmailMessage) -> Result<()> {
        let resource = self.inner().descriptor()?.resource_name;
        let body = message.to_xml()?;
        self.inner()
            .connection()
            .send(ApiRequest::post(resource).id(id).action("email").body(body))
            .await?;
        info!(resource, id, "Mail sent");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn cancel(&self, id: i64) -> Result<()> {
        let resource = self.inner().descriptor()?.resource_name;
        self.inner()
            .connection()
            .send(ApiRequest::put(resource).id(id).action("cancel"))
            .await?;
        info!(resource, id, "Canceled");
        Ok(())
    }

    /// The customer the document is addressed to.
    #[tracing::instrument(skip(self, document), fields(id = document.id()))]
    async fn customer(&self, document: &T) -> Result<Customer> {
        self.inner()
            .sibling::<Customer>()
            .find(document.transaction().client_id)
            .await
    }
}
