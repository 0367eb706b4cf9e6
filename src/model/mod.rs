//! Resource data types of the invoicing API and the crate-wide [`REGISTRY`].
//!
//! Every type here implements [`Resource`](crate::framework::Resource) through
//! an explicit field table. Fields the server owns (ids, totals, generated
//! numbers, states) are crate-private with public getters: only the mapper
//! writes them.

use std::sync::LazyLock;

use crate::framework::{Operation, Registry, ResourceDescriptor};

/// Descriptor for a plain struct field: `field!(Type, "wire_name" => member)`.
macro_rules! field {
    ($ty:ty, $wire:literal => $member:ident) => {
        $crate::framework::FieldDescriptor::new(
            $wire,
            |item: &$ty| &item.$member,
            |item: &mut $ty| &mut item.$member,
        )
    };
}

/// Declares a typed enum whose values travel as fixed upper-case strings.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $crate::framework::WireEnum for $name {
            const WIRE_NAMES: &'static [&'static str] = &[$($wire),+];

            fn wire_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            fn from_wire_name(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($wire) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::framework::WireEnum::wire_name(self))
            }
        }

        $crate::wire_enum_field!($name);
    };
}

pub mod article;
pub mod common;
pub mod customer;
pub mod email;
pub mod invoice;
pub mod offer;
pub mod settings;
pub mod template;
pub mod user;

pub use article::{Article, Unit};
pub use common::{CommentFields, ItemFields, NumberedFields, TransactionFields};
pub use customer::Customer;
pub use email::EmailMessage;
pub use invoice::{Invoice, InvoiceComment, InvoiceItem, InvoicePayment, InvoiceStatus};
pub use offer::{Offer, OfferComment, OfferItem, OfferStatus};
pub use settings::Settings;
pub use template::{Template, TemplateFormat, TemplateType, ThumbType};
pub use user::User;

/// Descriptors of every resource type, built once on first use.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    Registry::builder()
        .register::<Invoice>(ResourceDescriptor::new("invoices", "invoice", "invoices"))
        .register::<Offer>(ResourceDescriptor::new("offers", "offer", "offers"))
        .register::<Customer>(ResourceDescriptor::new("clients", "client", "clients"))
        .register::<Article>(ResourceDescriptor::new("articles", "article", "articles"))
        .register::<Unit>(ResourceDescriptor::new("units", "unit", "units"))
        .register::<InvoiceItem>(ResourceDescriptor::new("invoice-items", "invoice-item", "invoice-items"))
        .register::<OfferItem>(ResourceDescriptor::new("offer-items", "offer-item", "offer-items"))
        .register::<InvoiceComment>(
            ResourceDescriptor::new("invoice-comments", "invoice-comment", "invoice-comments")
                .without(Operation::Update),
        )
        .register::<OfferComment>(
            ResourceDescriptor::new("offer-comments", "offer-comment", "offer-comments").without(Operation::Update),
        )
        .register::<InvoicePayment>(
            ResourceDescriptor::new("invoice-payments", "invoice-payment", "invoice-payments")
                .without(Operation::Update),
        )
        .register::<User>(ResourceDescriptor::new("users", "user", "users").read_only())
        .register::<Settings>(
            ResourceDescriptor::new("settings", "settings", "settings")
                .without(Operation::Create)
                .without(Operation::Delete),
        )
        .register::<Template>(ResourceDescriptor::new("templates", "template", "templates"))
        .build()
});
