//! Typed search criteria for `find_all`.
//!
//! Unset criteria are not sent. Empty strings count as unset.

use chrono::NaiveDate;

use super::resource_client::QueryFilter;
use crate::framework::codec::DATE_FORMAT;
use crate::framework::{ResourceDescriptor, WireEnum};
use crate::model::{InvoiceStatus, OfferStatus, TemplateType};

/// Collects `key=value` pairs, skipping absent and empty values.
#[derive(Default)]
struct Params(Vec<(String, String)>);

impl Params {
    fn text(mut self, key: &str, value: &Option<String>) -> Self {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            self.0.push((key.to_string(), value.to_string()));
        }
        self
    }

    fn id(mut self, key: &str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.to_string()));
        }
        self
    }

    fn date(mut self, key: &str, value: Option<NaiveDate>) -> Self {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.format(DATE_FORMAT).to_string()));
        }
        self
    }

    fn wire<E: WireEnum>(mut self, key: &str, value: Option<E>) -> Self {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.wire_name().to_string()));
        }
        self
    }
}

/// Criteria shared by invoices and offers. `S` is the resource's status enum.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter<S> {
    pub client_id: Option<i64>,
    /// Matched against `invoice_number` or `offer_number`.
    pub number: Option<String>,
    pub status: Option<S>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub intro: Option<String>,
    pub note: Option<String>,
}

impl<S> Default for TransactionFilter<S> {
    fn default() -> Self {
        Self {
            client_id: None,
            number: None,
            status: None,
            from: None,
            to: None,
            intro: None,
            note: None,
        }
    }
}

impl<S> TransactionFilter<S> {
    pub fn client(client_id: i64) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: S) -> Self {
        self.status = Some(status);
        self
    }

    /// Inclusive date range.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

impl<S: WireEnum + std::fmt::Debug> QueryFilter for TransactionFilter<S> {
    fn to_params(&self, resource: &ResourceDescriptor) -> Vec<(String, String)> {
        let number_key = format!("{}_number", resource.xml_singular);
        Params::default()
            .id("client_id", self.client_id)
            .text(&number_key, &self.number)
            .wire("status", self.status)
            .date("from", self.from)
            .date("to", self.to)
            .text("intro", &self.intro)
            .text("note", &self.note)
            .0
    }
}

pub type InvoiceFilter = TransactionFilter<InvoiceStatus>;
pub type OfferFilter = TransactionFilter<OfferStatus>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub client_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country_code: Option<String>,
    pub note: Option<String>,
}

impl QueryFilter for CustomerFilter {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Params::default()
            .text("name", &self.name)
            .text("client_number", &self.client_number)
            .text("first_name", &self.first_name)
            .text("last_name", &self.last_name)
            .text("country_code", &self.country_code)
            .text("note", &self.note)
            .0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub article_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub currency_code: Option<String>,
    pub unit_id: Option<i64>,
}

impl QueryFilter for ArticleFilter {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Params::default()
            .text("article_number", &self.article_number)
            .text("title", &self.title)
            .text("description", &self.description)
            .text("currency_code", &self.currency_code)
            .id("unit_id", self.unit_id)
            .0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl QueryFilter for UserFilter {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Params::default()
            .text("email", &self.email)
            .text("first_name", &self.first_name)
            .text("last_name", &self.last_name)
            .0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFilter {
    pub template_type: Option<TemplateType>,
}

impl QueryFilter for TemplateFilter {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Params::default().wire("type", self.template_type).0
    }
}

/// Children of one invoice (items, comments, payments).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByInvoice {
    pub invoice_id: Option<i64>,
}

impl QueryFilter for ByInvoice {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Params::default().id("invoice_id", self.invoice_id).0
    }
}

/// Children of one offer (items, comments).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByOffer {
    pub offer_id: Option<i64>,
}

impl QueryFilter for ByOffer {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Params::default().id("offer_id", self.offer_id).0
    }
}
