use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::framework::{Resource, ResourceDescriptor, ResourceMapper, Result};

/// Query parameters of a typed `find_all`.
pub trait QueryFilter: Debug + Default + Send + Sync {
    /// Parameters to add to the listing request of `resource`.
    fn to_params(&self, resource: &ResourceDescriptor) -> Vec<(String, String)>;
}

/// No filtering.
impl QueryFilter for () {
    fn to_params(&self, _resource: &ResourceDescriptor) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Trait for resource-specific clients to inherit standard CRUD operations.
///
/// This trait reduces boilerplate by providing default implementations for
/// every operation the [`ResourceMapper`] offers. A client only supplies its
/// mapper and its filter type. Operations the resource does not permit fail
/// with `OperationNotPermitted` before any request is sent.
#[async_trait]
pub trait ResourceClient<T: Resource>: Send + Sync {
    /// Typed search criteria for [`ResourceClient::find_all`].
    type Filter: QueryFilter;

    /// Access the inner generic mapper.
    fn inner(&self) -> &ResourceMapper<T>;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn find(&self, id: i64) -> Result<T> {
        tracing::debug!("Sending request");
        self.inner().find(id).await
    }

    /// Every entity matching `filter`, across all pages.
    #[tracing::instrument(skip(self))]
    async fn find_all(&self, filter: &Self::Filter) -> Result<Vec<T>> {
        tracing::debug!("Sending request");
        let params = filter.to_params(self.inner().descriptor()?);
        self.inner().find_all(&params).await
    }

    /// Every entity, keyed by ID.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<HashMap<i64, T>> {
        let items = self.find_all(&Self::Filter::default()).await?;
        Ok(items.into_iter().map(|item| (item.id(), item)).collect())
    }

    /// Creates `item`; server-assigned fields are written back onto it.
    #[tracing::instrument(skip(self, item))]
    async fn create(&self, item: &mut T) -> Result<T> {
        tracing::debug!("Sending request");
        self.inner().create(item).await
    }

    #[tracing::instrument(skip(self, item), fields(id = item.id()))]
    async fn update(&self, item: &T) -> Result<()> {
        tracing::debug!("Sending request");
        self.inner().update(item).await
    }

    /// Delete an entity. `Ok(false)` when the server refuses.
    #[tracing::instrument(skip(self, item), fields(id = item.id()))]
    async fn delete(&self, item: &T) -> Result<bool> {
        tracing::debug!("Sending request");
        self.inner().delete(item).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        tracing::debug!("Sending request");
        self.inner().delete_by_id(id).await
    }
}
