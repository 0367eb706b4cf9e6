//! Typed clients, one per resource, built on [`ResourceMapper`](crate::framework::ResourceMapper).
//!
//! Every client implements [`ResourceClient`] and so gets `find`, `find_all`,
//! `list`, `create`, `update` and `delete`. Invoices and offers also implement
//! [`TransactionClient`] for their document actions.

/// Declares `{Resource}Client` wrapping a [`ResourceMapper`](crate::framework::ResourceMapper)
/// and implements [`ResourceClient`] for it.
macro_rules! resource_client {
    ($(#[$meta:meta])* $resource:ident, filter = $filter:ty) => {
        paste::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone)]
            pub struct [<$resource Client>] {
                mapper: $crate::framework::ResourceMapper<$resource>,
            }

            impl [<$resource Client>] {
                pub fn new(connection: ::std::sync::Arc<$crate::transport::ApiConnection>) -> Self {
                    Self::from_mapper($crate::framework::ResourceMapper::new(connection))
                }

                pub fn from_mapper(mapper: $crate::framework::ResourceMapper<$resource>) -> Self {
                    Self { mapper }
                }
            }

            #[::async_trait::async_trait]
            impl $crate::clients::ResourceClient<$resource> for [<$resource Client>] {
                type Filter = $filter;

                fn inner(&self) -> &$crate::framework::ResourceMapper<$resource> {
                    &self.mapper
                }
            }
        }
    };
}

pub mod account_client;
pub mod catalog_client;
pub mod customer_client;
pub mod filters;
pub mod invoice_client;
pub mod offer_client;
pub mod resource_client;
pub mod transaction_client;

pub use account_client::*;
pub use catalog_client::*;
pub use customer_client::*;
pub use filters::*;
pub use invoice_client::*;
pub use offer_client::*;
pub use resource_client::*;
pub use transaction_client::*;
