use std::sync::Arc;

use tracing::instrument;

use super::filters::{TemplateFilter, UserFilter};
use crate::framework::{ResourceMapper, Result};
use crate::model::{Settings, Template, ThumbType, User};
use crate::transport::{ApiConnection, ApiRequest};

resource_client!(
    /// Read-only client for account users.
    User,
    filter = UserFilter
);

impl UserClient {
    /// The user the API key belongs to.
    #[instrument(skip(self))]
    pub async fn myself(&self) -> Result<User> {
        let resource = self.mapper.descriptor()?.resource_name;
        self.mapper.fetch(ApiRequest::get(resource).action("myself")).await
    }
}

resource_client!(
    /// Client for document templates.
    Template,
    filter = TemplateFilter
);

impl TemplateClient {
    /// Preview image of the template's first page.
    #[instrument(skip(self))]
    pub async fn thumb(&self, id: i64, thumb_type: ThumbType) -> Result<Vec<u8>> {
        let resource = self.mapper.descriptor()?.resource_name;
        let request = ApiRequest::get(resource)
            .id(id)
            .action("thumb")
            .param("type", thumb_type.as_str());
        self.mapper.connection().send(request).await
    }
}

/// Client for the account settings singleton.
///
/// Settings have no id of their own, so this client offers `load` and
/// `update` only and does not implement
/// [`ResourceClient`](super::ResourceClient).
#[derive(Debug, Clone)]
pub struct SettingsClient {
    mapper: ResourceMapper<Settings>,
}

impl SettingsClient {
    pub fn new(connection: Arc<ApiConnection>) -> Self {
        Self::from_mapper(ResourceMapper::new(connection))
    }

    pub fn from_mapper(mapper: ResourceMapper<Settings>) -> Self {
        Self { mapper }
    }

    /// `GET settings`.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Settings> {
        let resource = self.mapper.descriptor()?.resource_name;
        self.mapper.fetch(ApiRequest::get(resource)).await
    }

    /// `PUT settings` with every writable field.
    #[instrument(skip(self, settings))]
    pub async fn update(&self, settings: &Settings) -> Result<()> {
        self.mapper.update_singleton(settings).await
    }
}
