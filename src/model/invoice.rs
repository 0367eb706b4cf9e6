use std::sync::LazyLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::common::{embed_all, require_id, CommentFields, ItemFields, NumberedFields, TransactionFields};
use crate::framework::{Error, FieldDescriptor, ObjectMeta, Resource, Result};

wire_enum! {
    /// Life cycle state of an invoice, assigned by the server.
    InvoiceStatus {
        Draft => "DRAFT",
        Open => "OPEN",
        Overdue => "OVERDUE",
        Paid => "PAID",
        Canceled => "CANCELED",
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice.
///
/// New invoices only need a `client_id`; the number, totals and status are
/// filled in by the server on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub(crate) meta: ObjectMeta,
    pub numbered: NumberedFields,
    pub transaction: TransactionFields,
    pub(crate) invoice_number: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub(crate) due_days: i64,
    pub discount_rate: Option<f64>,
    pub discount_date: Option<NaiveDateTime>,
    pub(crate) discount_days: i64,
    pub discount_amount: Option<f64>,
    pub(crate) status: Option<InvoiceStatus>,
}

impl Invoice {
    pub fn new(client_id: i64) -> Self {
        let mut invoice = Self::default();
        invoice.transaction.client_id = client_id;
        invoice
    }

    /// Formatted number, e.g. `RE123`.
    pub fn invoice_number(&self) -> Option<&str> {
        self.invoice_number.as_deref()
    }

    pub fn status(&self) -> Option<InvoiceStatus> {
        self.status
    }

    pub fn due_days(&self) -> i64 {
        self.due_days
    }

    pub fn discount_days(&self) -> i64 {
        self.discount_days
    }
}

static INVOICE_FIELDS: LazyLock<Vec<FieldDescriptor<Invoice>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|i: &Invoice| &i.meta, |i: &mut Invoice| &mut i.meta);
    fields.extend(embed_all(
        NumberedFields::fields(),
        |i: &Invoice| &i.numbered,
        |i: &mut Invoice| &mut i.numbered,
    ));
    fields.extend(embed_all(
        TransactionFields::fields(),
        |i: &Invoice| &i.transaction,
        |i: &mut Invoice| &mut i.transaction,
    ));
    fields.extend([
        field!(Invoice, "invoice_number" => invoice_number).read_only(),
        field!(Invoice, "due_date" => due_date),
        field!(Invoice, "due_days" => due_days).read_only(),
        field!(Invoice, "discount_rate" => discount_rate),
        field!(Invoice, "discount_date" => discount_date),
        field!(Invoice, "discount_days" => discount_days).read_only(),
        field!(Invoice, "discount_amount" => discount_amount),
        field!(Invoice, "status" => status).read_only(),
    ]);
    fields
});

impl Resource for Invoice {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &INVOICE_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        self.transaction.validate_create()
    }
}

// =============================================================================
// Invoice items
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub(crate) meta: ObjectMeta,
    pub invoice_id: i64,
    pub item: ItemFields,
}

impl InvoiceItem {
    pub fn new(invoice_id: i64) -> Self {
        Self {
            invoice_id,
            ..Self::default()
        }
    }
}

static INVOICE_ITEM_FIELDS: LazyLock<Vec<FieldDescriptor<InvoiceItem>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|i: &InvoiceItem| &i.meta, |i: &mut InvoiceItem| &mut i.meta);
    fields.push(field!(InvoiceItem, "invoice_id" => invoice_id));
    fields.extend(embed_all(
        ItemFields::fields(),
        |i: &InvoiceItem| &i.item,
        |i: &mut InvoiceItem| &mut i.item,
    ));
    fields
});

impl Resource for InvoiceItem {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &INVOICE_ITEM_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_id(self.invoice_id, "invoice_id")
    }
}

// =============================================================================
// Invoice comments
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceComment {
    pub(crate) meta: ObjectMeta,
    pub invoice_id: i64,
    pub comment: CommentFields,
}

impl InvoiceComment {
    pub fn new(invoice_id: i64, comment: impl Into<String>) -> Self {
        Self {
            invoice_id,
            comment: CommentFields {
                comment: Some(comment.into()),
                ..CommentFields::default()
            },
            ..Self::default()
        }
    }
}

static INVOICE_COMMENT_FIELDS: LazyLock<Vec<FieldDescriptor<InvoiceComment>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|c: &InvoiceComment| &c.meta, |c: &mut InvoiceComment| &mut c.meta);
    fields.push(field!(InvoiceComment, "invoice_id" => invoice_id));
    fields.extend(embed_all(
        CommentFields::fields(),
        |c: &InvoiceComment| &c.comment,
        |c: &mut InvoiceComment| &mut c.comment,
    ));
    fields
});

impl Resource for InvoiceComment {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &INVOICE_COMMENT_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_id(self.invoice_id, "invoice_id")?;
        self.comment.validate_create()
    }
}

// =============================================================================
// Invoice payments
// =============================================================================

/// A payment booked against an invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePayment {
    pub(crate) meta: ObjectMeta,
    pub invoice_id: i64,
    pub date: Option<NaiveDateTime>,
    pub amount: f64,
    pub comment: Option<String>,
    pub(crate) mark_invoice_as_payed: bool,
}

impl InvoicePayment {
    pub fn new(invoice_id: i64, amount: f64) -> Self {
        Self {
            invoice_id,
            amount,
            ..Self::default()
        }
    }

    /// Whether the create request asks the server to set the invoice to `PAID`.
    pub fn marks_invoice_as_paid(&self) -> bool {
        self.mark_invoice_as_payed
    }
}

static INVOICE_PAYMENT_FIELDS: LazyLock<Vec<FieldDescriptor<InvoicePayment>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|p: &InvoicePayment| &p.meta, |p: &mut InvoicePayment| &mut p.meta);
    fields.extend([
        field!(InvoicePayment, "invoice_id" => invoice_id),
        field!(InvoicePayment, "date" => date),
        field!(InvoicePayment, "amount" => amount),
        field!(InvoicePayment, "comment" => comment),
        field!(InvoicePayment, "mark_invoice_as_payed" => mark_invoice_as_payed),
    ]);
    fields
});

impl Resource for InvoicePayment {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &INVOICE_PAYMENT_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_id(self.invoice_id, "invoice_id")?;
        if self.amount == 0.0 {
            return Err(Error::MissingField("amount"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{to_xml, ErrorKind};

    #[test]
    fn test_invoice_requires_client() {
        let err = Invoice::default().validate_create().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert!(Invoice::new(12).validate_create().is_ok());
    }

    #[test]
    fn test_invoice_payload_omits_server_fields() {
        let mut invoice = Invoice::new(12);
        invoice.transaction.intro = Some("Thanks".into());
        invoice.status = Some(InvoiceStatus::Paid);
        invoice.invoice_number = Some("RE1".into());

        let xml = to_xml("invoice", &invoice).unwrap();
        assert_eq!(xml.child_text("client_id"), Some("12"));
        assert_eq!(xml.child_text("intro"), Some("Thanks"));
        assert!(xml.child("status").is_none());
        assert!(xml.child("invoice_number").is_none());
        assert!(xml.child("total_gross").is_none());
    }

    #[test]
    fn test_comment_and_payment_mandatory_fields() {
        assert_eq!(
            InvoiceComment::new(3, "  ").validate_create().unwrap_err().to_string(),
            "Missing mandatory field: comment"
        );
        assert!(InvoiceComment::new(3, "paid by phone").validate_create().is_ok());

        let err = InvoicePayment::new(3, 0.0).validate_create().unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field: amount");
        let err = InvoicePayment::new(0, 10.0).validate_create().unwrap_err();
        assert_eq!(err.to_string(), "Missing mandatory field: invoice_id");
    }
}
