//! # Field Descriptor Registry
//!
//! Maps resource types to their [`ResourceDescriptor`]. The crate-wide
//! registry ([`model::REGISTRY`](crate::model::REGISTRY)) is built once on
//! first access and is read-only afterwards, so concurrent clients share it
//! without locking.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use tracing::error;

use super::descriptor::{FieldDescriptor, ResourceDescriptor};
use super::error::{Error, Result};
use super::resource::Resource;

/// Read-only table of resource descriptors keyed by type.
#[derive(Debug, Default)]
pub struct Registry {
    resources: HashMap<TypeId, ResourceDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Descriptor of `T`, or [`Error::MissingResourceMetadata`] if `T` was
    /// never registered.
    pub fn lookup<T: Resource>(&self) -> Result<&ResourceDescriptor> {
        self.resources
            .get(&TypeId::of::<T>())
            .ok_or(Error::MissingResourceMetadata(type_name::<T>()))
    }

    /// Field table of `T` in declaration order.
    pub fn fields_of<T: Resource>(&self) -> &'static [FieldDescriptor<T>] {
        T::fields()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Collects registrations before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    resources: HashMap<TypeId, ResourceDescriptor>,
}

impl RegistryBuilder {
    /// Registers `T`.
    ///
    /// # Panics
    /// Registering a type twice is a programming error and panics in debug
    /// builds. Release builds keep the first descriptor and log the duplicate.
    pub fn register<T: Resource>(mut self, descriptor: ResourceDescriptor) -> Self {
        let key = TypeId::of::<T>();
        if let Some(existing) = self.resources.get(&key) {
            debug_assert!(
                false,
                "Duplicate resource registration for {}: '{}' already registered, '{}' rejected",
                type_name::<T>(),
                existing.resource_name,
                descriptor.resource_name
            );
            error!(
                resource = existing.resource_name,
                ignored = descriptor.resource_name,
                "Duplicate resource registration for {}",
                type_name::<T>()
            );
        } else {
            self.resources.insert(key, descriptor);
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            resources: self.resources,
        }
    }
}
