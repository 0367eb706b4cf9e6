use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::framework::{FieldDescriptor, ObjectMeta, Resource};

/// Account-wide defaults. There is exactly one settings object per account;
/// it can be loaded and updated but not created or deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub(crate) meta: ObjectMeta,
    pub invoice_intro: Option<String>,
    pub invoice_note: Option<String>,
    pub offer_intro: Option<String>,
    pub offer_note: Option<String>,
    pub invoice_email_subject: Option<String>,
    pub invoice_email_body: Option<String>,
    pub offer_email_subject: Option<String>,
    pub offer_email_body: Option<String>,
    pub article_number_pre: Option<String>,
    pub client_number_pre: Option<String>,
    pub invoice_number_pre: Option<String>,
    pub offer_number_pre: Option<String>,
    pub currency_code: Option<String>,
    pub tax_rate: f64,
    pub tax_name: Option<String>,
    pub discount_rate: f64,
    pub discount_days: i64,
    pub due_days: i64,
}

static SETTINGS_FIELDS: LazyLock<Vec<FieldDescriptor<Settings>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|s: &Settings| &s.meta, |s: &mut Settings| &mut s.meta);
    fields.extend([
        field!(Settings, "invoice_intro" => invoice_intro),
        field!(Settings, "invoice_note" => invoice_note),
        field!(Settings, "offer_intro" => offer_intro),
        field!(Settings, "offer_note" => offer_note),
        field!(Settings, "invoice_email_subject" => invoice_email_subject),
        field!(Settings, "invoice_email_body" => invoice_email_body),
        field!(Settings, "offer_email_subject" => offer_email_subject),
        field!(Settings, "offer_email_body" => offer_email_body),
        field!(Settings, "article_number_pre" => article_number_pre),
        field!(Settings, "client_number_pre" => client_number_pre),
        field!(Settings, "invoice_number_pre" => invoice_number_pre),
        field!(Settings, "offer_number_pre" => offer_number_pre),
        field!(Settings, "currency_code" => currency_code),
        field!(Settings, "tax_rate" => tax_rate),
        field!(Settings, "tax_name" => tax_name),
        field!(Settings, "discount_rate" => discount_rate),
        field!(Settings, "discount_days" => discount_days),
        field!(Settings, "due_days" => due_days),
    ]);
    fields
});

impl Resource for Settings {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &SETTINGS_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}
