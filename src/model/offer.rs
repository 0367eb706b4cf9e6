use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::common::{embed_all, require_id, CommentFields, ItemFields, NumberedFields, TransactionFields};
use crate::framework::{FieldDescriptor, ObjectMeta, Resource, Result};

wire_enum! {
    OfferStatus {
        Draft => "DRAFT",
        Open => "OPEN",
        Won => "WON",
        Lost => "LOST",
        Canceled => "CANCELED",
    }
}

/// An offer (quote) sent to a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub(crate) meta: ObjectMeta,
    pub numbered: NumberedFields,
    pub transaction: TransactionFields,
    pub(crate) offer_number: Option<String>,
    pub(crate) status: Option<OfferStatus>,
}

impl Offer {
    pub fn new(client_id: i64) -> Self {
        let mut offer = Self::default();
        offer.transaction.client_id = client_id;
        offer
    }

    pub fn offer_number(&self) -> Option<&str> {
        self.offer_number.as_deref()
    }

    pub fn status(&self) -> Option<OfferStatus> {
        self.status
    }
}

static OFFER_FIELDS: LazyLock<Vec<FieldDescriptor<Offer>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|o: &Offer| &o.meta, |o: &mut Offer| &mut o.meta);
    fields.extend(embed_all(NumberedFields::fields(), |o: &Offer| &o.numbered, |o: &mut Offer| &mut o.numbered));
    fields.extend(embed_all(
        TransactionFields::fields(),
        |o: &Offer| &o.transaction,
        |o: &mut Offer| &mut o.transaction,
    ));
    fields.push(field!(Offer, "offer_number" => offer_number).read_only());
    fields.push(field!(Offer, "status" => status).read_only());
    fields
});

impl Resource for Offer {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &OFFER_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        self.transaction.validate_create()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferItem {
    pub(crate) meta: ObjectMeta,
    pub offer_id: i64,
    pub item: ItemFields,
}

impl OfferItem {
    pub fn new(offer_id: i64) -> Self {
        Self {
            offer_id,
            ..Self::default()
        }
    }
}

static OFFER_ITEM_FIELDS: LazyLock<Vec<FieldDescriptor<OfferItem>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|i: &OfferItem| &i.meta, |i: &mut OfferItem| &mut i.meta);
    fields.push(field!(OfferItem, "offer_id" => offer_id));
    fields.extend(embed_all(ItemFields::fields(), |i: &OfferItem| &i.item, |i: &mut OfferItem| &mut i.item));
    fields
});

impl Resource for OfferItem {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &OFFER_ITEM_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_id(self.offer_id, "offer_id")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferComment {
    pub(crate) meta: ObjectMeta,
    pub offer_id: i64,
    pub comment: CommentFields,
}

impl OfferComment {
    pub fn new(offer_id: i64, comment: impl Into<String>) -> Self {
        Self {
            offer_id,
            comment: CommentFields {
                comment: Some(comment.into()),
                ..CommentFields::default()
            },
            ..Self::default()
        }
    }
}

static OFFER_COMMENT_FIELDS: LazyLock<Vec<FieldDescriptor<OfferComment>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|c: &OfferComment| &c.meta, |c: &mut OfferComment| &mut c.meta);
    fields.push(field!(OfferComment, "offer_id" => offer_id));
    fields.extend(embed_all(
        CommentFields::fields(),
        |c: &OfferComment| &c.comment,
        |c: &mut OfferComment| &mut c.comment,
    ));
    fields
});

impl Resource for OfferComment {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &OFFER_COMMENT_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_id(self.offer_id, "offer_id")?;
        self.comment.validate_create()
    }
}
