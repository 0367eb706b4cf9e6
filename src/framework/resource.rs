//! The [`Resource`] trait and the metadata every remote object carries.

use std::fmt::Debug;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::descriptor::FieldDescriptor;
use super::error::Result;

/// Trait that any resource type must implement to be handled by the mapper.
///
/// # Architecture Note
/// By defining one contract that every resource type (invoices, clients,
/// articles...) satisfies, the CRUD engine in [`ResourceMapper`](super::ResourceMapper)
/// is written *once* and reused everywhere. A resource only has to be
/// default-constructible, expose its field table and expose its [`ObjectMeta`].
///
/// # Provided Methods (Hooks)
/// - [`Resource::validate_create`] runs before a create request is built.
///   The default implementation accepts everything.
pub trait Resource: Default + Clone + Debug + Send + Sync + 'static {
    /// Ordered field table. Order only affects serialization output.
    fn fields() -> &'static [FieldDescriptor<Self>];

    /// Server-assigned id and creation time.
    fn meta(&self) -> &ObjectMeta;

    fn id(&self) -> i64 {
        self.meta().id
    }

    /// Checks mandatory fields before a create. Fails with `MissingField`.
    fn validate_create(&self) -> Result<()> {
        Ok(())
    }
}

/// Fields shared by every remote object. Both are assigned by the server and
/// only ever written by the mapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub(crate) id: i64,
    pub(crate) created: NaiveDateTime,
}

impl ObjectMeta {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn created(&self) -> NaiveDateTime {
        self.created
    }

    /// Field group for `id` and `created`.
    pub fn fields() -> Vec<FieldDescriptor<ObjectMeta>> {
        vec![
            FieldDescriptor::new("id", |m: &ObjectMeta| &m.id, |m: &mut ObjectMeta| &mut m.id).read_only(),
            FieldDescriptor::new("created", |m: &ObjectMeta| &m.created, |m: &mut ObjectMeta| &mut m.created)
                .read_only(),
        ]
    }

    /// Meta fields lifted into the owning resource type `O`.
    pub fn embedded<O: 'static>(
        outer: fn(&O) -> &ObjectMeta,
        outer_mut: fn(&mut O) -> &mut ObjectMeta,
    ) -> Vec<FieldDescriptor<O>> {
        Self::fields()
            .into_iter()
            .map(|f| f.embed(outer, outer_mut))
            .collect()
    }
}
