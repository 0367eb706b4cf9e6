//! Field groups shared by several resource types.
//!
//! A group is a plain struct with its own field table. Resource types embed it
//! as a member and lift the table with [`embed_all`], so the mapper sees one
//! flat list per resource.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::framework::{Error, FieldDescriptor, Result};

/// Lifts a whole field group into the owning type `O`.
pub(crate) fn embed_all<G: 'static, O: 'static>(
    fields: Vec<FieldDescriptor<G>>,
    outer: fn(&O) -> &G,
    outer_mut: fn(&mut O) -> &mut G,
) -> Vec<FieldDescriptor<O>> {
    fields.into_iter().map(|f| f.embed(outer, outer_mut)).collect()
}

pub(crate) fn require_id(value: i64, field: &'static str) -> Result<()> {
    if value == 0 {
        return Err(Error::MissingField(field));
    }
    Ok(())
}

pub(crate) fn require_text(value: &Option<String>, field: &'static str) -> Result<()> {
    match value.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(Error::MissingField(field)),
    }
}

// =============================================================================
// Numbered objects
// =============================================================================

/// Number and number prefix of an object the server numbers sequentially.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberedFields {
    pub number: Option<i64>,
    pub number_pre: Option<String>,
}

impl NumberedFields {
    pub fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![field!(Self, "number" => number), field!(Self, "number_pre" => number_pre)]
    }
}

// =============================================================================
// Transactions (invoices, offers)
// =============================================================================

/// Fields every invoice and offer carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFields {
    pub client_id: i64,
    pub date: Option<NaiveDateTime>,
    pub address: Option<String>,
    pub intro: Option<String>,
    pub note: Option<String>,
    pub(crate) total_gross: f64,
    pub(crate) total_net: f64,
    pub currency_code: Option<String>,
    pub quote: Option<f64>,
}

impl TransactionFields {
    pub fn total_gross(&self) -> f64 {
        self.total_gross
    }

    pub fn total_net(&self) -> f64 {
        self.total_net
    }

    pub fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(Self, "client_id" => client_id),
            field!(Self, "date" => date),
            field!(Self, "address" => address),
            field!(Self, "intro" => intro),
            field!(Self, "note" => note),
            field!(Self, "total_gross" => total_gross).read_only(),
            field!(Self, "total_net" => total_net).read_only(),
            field!(Self, "currency_code" => currency_code),
            field!(Self, "quote" => quote),
        ]
    }

    pub(crate) fn validate_create(&self) -> Result<()> {
        require_id(self.client_id, "client_id")
    }
}

// =============================================================================
// Transaction items
// =============================================================================

/// One position of an invoice or offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub(crate) position: Option<i64>,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub tax_name: Option<String>,
    pub tax_rate: Option<f64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub(crate) total_gross: f64,
    pub(crate) total_net: f64,
}

impl ItemFields {
    pub fn position(&self) -> Option<i64> {
        self.position
    }

    pub fn total_gross(&self) -> f64 {
        self.total_gross
    }

    pub fn total_net(&self) -> f64 {
        self.total_net
    }

    pub fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(Self, "position" => position).read_only(),
            field!(Self, "unit" => unit),
            field!(Self, "quantity" => quantity),
            field!(Self, "unit_price" => unit_price),
            field!(Self, "tax_name" => tax_name),
            field!(Self, "tax_rate" => tax_rate),
            field!(Self, "title" => title),
            field!(Self, "description" => description),
            field!(Self, "total_gross" => total_gross).read_only(),
            field!(Self, "total_net" => total_net).read_only(),
        ]
    }
}

// =============================================================================
// Transaction comments
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentFields {
    pub(crate) user_id: Option<i64>,
    pub comment: Option<String>,
}

impl CommentFields {
    /// Author of the comment, assigned by the server.
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field!(Self, "user_id" => user_id).read_only(),
            field!(Self, "comment" => comment),
        ]
    }

    pub(crate) fn validate_create(&self) -> Result<()> {
        require_text(&self.comment, "comment")
    }
}
