//! # Resource Mapper
//!
//! The generic CRUD engine. [`to_xml`] and [`from_xml`] walk a resource's field
//! table and run every value through the [codec](super::codec);
//! [`ResourceMapper`] drives the HTTP calls on top of them.
//!
//! # Architecture Note
//! The mapper holds no per-call state. Everything it knows about a resource
//! comes from the [`Registry`] (URL segment, tags, permissions) and from
//! [`Resource::fields`]. Adding a resource type therefore never touches this
//! file.
//!
//! Create, update and delete share one precondition gate: the permission check
//! runs before any request is built, so a forbidden operation never reaches the
//! network.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::codec;
use super::descriptor::ResourceDescriptor;
use super::error::{Error, Operation, Result};
use super::registry::Registry;
use super::resource::Resource;
use crate::transport::{ApiConnection, ApiRequest};
use crate::xml::XmlElement;

/// Upper bound for sizing the result of a listing from its `total`.
const MAX_PREALLOCATED: u64 = 10_000;

// =============================================================================
// 1. OBJECT <-> XML
// =============================================================================

/// Serializes the writable, present fields of `item` under a root named `tag`.
pub fn to_xml<T: Resource>(tag: &str, item: &T) -> Result<XmlElement> {
    let mut root = XmlElement::new(tag);
    for field in T::fields() {
        if field.is_read_only() {
            continue;
        }
        let Some(value) = field.get(item) else {
            continue;
        };
        let encoded = codec::encode(field.wire_name(), field.kind(), &value)?;
        let mut child = XmlElement::with_text(field.wire_name(), encoded.text);
        if let Some(type_tag) = encoded.type_tag {
            child.set_attribute("type", type_tag);
        }
        root.push(child);
    }
    Ok(root)
}

/// Builds a fresh `T` from `element`. Missing children keep their default.
pub fn from_xml<T: Resource>(element: &XmlElement) -> Result<T> {
    let mut item = T::default();
    for field in T::fields() {
        let Some(child) = element.child(field.wire_name()) else {
            continue;
        };
        let value = codec::decode(field.wire_name(), child.text(), child.attribute("type"), field.kind())?;
        field.set(&mut item, value)?;
    }
    Ok(item)
}

// =============================================================================
// 2. THE GENERIC CRUD ENGINE
// =============================================================================

/// CRUD operations for one resource type over one [`ApiConnection`].
pub struct ResourceMapper<T: Resource> {
    connection: Arc<ApiConnection>,
    registry: &'static Registry,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> Clone for ResourceMapper<T> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            registry: self.registry,
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> std::fmt::Debug for ResourceMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMapper")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: Resource> ResourceMapper<T> {
    /// Mapper backed by the crate-wide [`REGISTRY`](crate::model::REGISTRY).
    pub fn new(connection: Arc<ApiConnection>) -> Self {
        Self::with_registry(connection, &crate::model::REGISTRY)
    }

    pub fn with_registry(connection: Arc<ApiConnection>, registry: &'static Registry) -> Self {
        Self {
            connection,
            registry,
            _marker: PhantomData,
        }
    }

    pub fn connection(&self) -> &ApiConnection {
        &self.connection
    }

    /// Mapper for another resource type over the same connection and registry.
    pub fn sibling<U: Resource>(&self) -> ResourceMapper<U> {
        ResourceMapper::with_registry(self.connection.clone(), self.registry)
    }

    /// Descriptor of `T`; fails loudly when `T` is unregistered.
    pub fn descriptor(&self) -> Result<&'static ResourceDescriptor> {
        self.registry.lookup::<T>()
    }

    /// `GET {resource}/{id}`.
    pub async fn find(&self, id: i64) -> Result<T> {
        let descriptor = self.descriptor()?;
        self.fetch(ApiRequest::get(descriptor.resource_name).id(id)).await
    }

    /// Sends `request` and maps the single root element of the answer.
    pub async fn fetch(&self, request: ApiRequest) -> Result<T> {
        let descriptor = self.descriptor()?;
        let resource = descriptor.resource_name;
        let path = request.path();
        debug!(resource, %path, "Find");
        let root = self.connection.send_xml(request).await?;
        expect_root(&root, descriptor.xml_singular)?;
        let item = from_xml::<T>(&root)?;
        info!(resource, id = item.id(), "Found");
        Ok(item)
    }

    /// Every item matching `filters`, fetched page by page.
    ///
    /// Every page must be wrapped in the resource's plural tag. The first
    /// page's `total` attribute is mandatory and bounds the result. A page
    /// shorter than `total` ends the listing: the result is truncated to what
    /// was received and a warning is logged.
    pub async fn find_all(&self, filters: &[(String, String)]) -> Result<Vec<T>> {
        let descriptor = self.descriptor()?;
        let resource = descriptor.resource_name;
        let page_size = u64::from(self.connection.config().page_size());

        let mut items: Vec<T> = Vec::new();
        let mut known_total: Option<u64> = None;
        let mut page: u64 = 1;

        loop {
            let request = ApiRequest::get(resource)
                .param("per_page", page_size.to_string())
                .param("page", page.to_string())
                .params(filters.iter().cloned());
            debug!(resource, page, "Find all");
            let root = self.connection.send_xml(request).await?;
            expect_root(&root, descriptor.xml_plural)?;

            let entries: Vec<&XmlElement> = root.children_named(descriptor.xml_singular).collect();
            let total = match known_total {
                Some(total) => total,
                None => {
                    let total = read_total(&root)?;
                    items.reserve(total.min(MAX_PREALLOCATED) as usize);
                    known_total = Some(total);
                    total
                }
            };

            let consumed = (page - 1) * page_size;
            let expected = total.saturating_sub(consumed).min(page_size);
            let received = entries.len() as u64;
            if received > expected {
                warn!(resource, page, expected, received, "Page holds more items than announced, extra items dropped");
            }

            for entry in entries.into_iter().take(expected as usize) {
                items.push(from_xml::<T>(entry)?);
            }

            if received < expected {
                warn!(resource, page, expected, received, total, "Short page, listing truncated");
                break;
            }
            if page * page_size >= total {
                break;
            }
            page += 1;
        }

        info!(resource, count = items.len(), pages = page, "Listed");
        Ok(items)
    }

    /// Creates `item` and copies every mapped field of the server's answer,
    /// server-assigned ones included, back onto it.
    pub async fn create(&self, item: &mut T) -> Result<T> {
        let descriptor = self.descriptor()?;
        descriptor.check(Operation::Create)?;
        item.validate_create()?;

        let body = to_xml(descriptor.xml_singular, item)?;
        debug!(resource = descriptor.resource_name, "Create");
        let root = self
            .connection
            .send_xml(ApiRequest::post(descriptor.resource_name).body(body))
            .await?;
        expect_root(&root, descriptor.xml_singular)?;

        let created = from_xml::<T>(&root)?;
        for field in T::fields() {
            field.copy(&created, item);
        }
        info!(resource = descriptor.resource_name, id = created.id(), "Created");
        Ok(created)
    }

    /// Sends the writable fields of `item`. The local copy is not refreshed.
    pub async fn update(&self, item: &T) -> Result<()> {
        self.put(item, Some(item.id())).await
    }

    /// `PUT {resource}` for resources that exist once per account and carry
    /// no id in their path.
    pub async fn update_singleton(&self, item: &T) -> Result<()> {
        self.put(item, None).await
    }

    async fn put(&self, item: &T, id: Option<i64>) -> Result<()> {
        let descriptor = self.descriptor()?;
        descriptor.check(Operation::Update)?;

        let body = to_xml(descriptor.xml_singular, item)?;
        debug!(resource = descriptor.resource_name, ?id, "Update");
        let mut request = ApiRequest::put(descriptor.resource_name);
        if let Some(id) = id {
            request = request.id(id);
        }
        self.connection.send(request.body(body)).await?;
        info!(resource = descriptor.resource_name, ?id, "Updated");
        Ok(())
    }

    /// `Ok(false)` when the server refuses the deletion.
    pub async fn delete(&self, item: &T) -> Result<bool> {
        self.delete_by_id(item.id()).await
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let descriptor = self.descriptor()?;
        descriptor.check(Operation::Delete)?;

        debug!(resource = descriptor.resource_name, id, "Delete");
        match self.connection.send(ApiRequest::delete(descriptor.resource_name).id(id)).await {
            Ok(_) => {
                info!(resource = descriptor.resource_name, id, "Deleted");
                Ok(true)
            }
            Err(e) if e.is_server_rejection() => {
                warn!(resource = descriptor.resource_name, id, error = %e, "Delete rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Rejects an answer whose root is not the tag the resource is exchanged under.
fn expect_root(root: &XmlElement, tag: &str) -> Result<()> {
    if root.name() == tag {
        return Ok(());
    }
    let message = format!("Unexpected response root <{}>, expected <{tag}>", root.name());
    Err(Error::request_failed(message.clone(), message))
}

/// `total` attribute of a list root.
fn read_total(root: &XmlElement) -> Result<u64> {
    let text = root.attribute("total").ok_or_else(|| {
        let message = format!("List <{}> carries no total attribute", root.name());
        Error::request_failed(message.clone(), message)
    })?;
    text.trim().parse::<u64>().map_err(|_| Error::ValueConversion {
        value: text.to_string(),
        kind: "int",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{ErrorKind, FieldDescriptor, ObjectMeta};
    use std::sync::LazyLock;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Gadget {
        meta: ObjectMeta,
        label: Option<String>,
        weight: f64,
        stock: Option<i64>,
        enabled: bool,
    }

    static GADGET_FIELDS: LazyLock<Vec<FieldDescriptor<Gadget>>> = LazyLock::new(|| {
        let mut fields = ObjectMeta::embedded(|g: &Gadget| &g.meta, |g: &mut Gadget| &mut g.meta);
        fields.extend([
            FieldDescriptor::new("label", |g: &Gadget| &g.label, |g: &mut Gadget| &mut g.label),
            FieldDescriptor::new("weight", |g: &Gadget| &g.weight, |g: &mut Gadget| &mut g.weight),
            FieldDescriptor::new("stock", |g: &Gadget| &g.stock, |g: &mut Gadget| &mut g.stock),
            FieldDescriptor::new("enabled", |g: &Gadget| &g.enabled, |g: &mut Gadget| &mut g.enabled),
        ]);
        fields
    });

    impl Resource for Gadget {
        fn fields() -> &'static [FieldDescriptor<Self>] {
            &GADGET_FIELDS
        }

        fn meta(&self) -> &ObjectMeta {
            &self.meta
        }
    }

    #[test]
    fn test_to_xml_skips_read_only_and_absent_fields() {
        let mut gadget = Gadget {
            label: Some("lamp".into()),
            weight: 1.25,
            enabled: true,
            ..Default::default()
        };
        gadget.meta.id = 42;

        let xml = to_xml("gadget", &gadget).unwrap();
        let names: Vec<_> = xml.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["label", "weight", "enabled"]);
        assert_eq!(xml.child("weight").unwrap().attribute("type"), Some("float"));
        assert_eq!(xml.child("label").unwrap().attribute("type"), None);
        assert_eq!(xml.child_text("enabled"), Some("1"));
    }

    #[test]
    fn test_round_trip_keeps_writable_fields() {
        let gadget = Gadget {
            label: Some("lamp & shade".into()),
            weight: 0.5,
            stock: Some(7),
            enabled: true,
            ..Default::default()
        };
        let xml = XmlElement::parse(&to_xml("gadget", &gadget).unwrap().to_document().unwrap()).unwrap();
        let back: Gadget = from_xml(&xml).unwrap();
        assert_eq!(back, gadget);
    }

    #[test]
    fn test_from_xml_reads_server_fields_and_defaults_missing_ones() {
        let xml = XmlElement::parse(
            r#"<gadget>
                <id type="integer">9</id>
                <created type="datetime">2013-02-01T10:00:00+01:00</created>
                <weight type="float">3.5</weight>
            </gadget>"#,
        )
        .unwrap();

        let gadget: Gadget = from_xml(&xml).unwrap();
        assert_eq!(gadget.id(), 9);
        assert_eq!(gadget.meta().created().to_string(), "2013-02-01 10:00:00");
        assert_eq!(gadget.weight, 3.5);
        assert_eq!(gadget.label, None);
        assert_eq!(gadget.stock, None);
    }

    #[test]
    fn test_from_xml_propagates_type_mismatch() {
        let xml = XmlElement::parse(r#"<gadget><weight type="integer">3</weight></gadget>"#).unwrap();
        let err = from_xml::<Gadget>(&xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_read_total() {
        let root = XmlElement::parse(r#"<gadgets total="250"/>"#).unwrap();
        assert_eq!(read_total(&root).unwrap(), 250);
        let root = XmlElement::parse(r#"<gadgets total="many"/>"#).unwrap();
        assert_eq!(read_total(&root).unwrap_err().kind(), ErrorKind::ValueConversion);
        let root = XmlElement::parse("<gadgets/>").unwrap();
        assert_eq!(read_total(&root).unwrap_err().kind(), ErrorKind::RequestFailed);
    }

    #[test]
    fn test_expect_root() {
        let root = XmlElement::parse("<gadget/>").unwrap();
        assert!(expect_root(&root, "gadget").is_ok());
        let err = expect_root(&root, "gadgets").unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: None, .. }));
        assert!(err.to_string().contains("<gadget>"));
    }
}
