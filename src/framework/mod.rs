//! Generic resource framework for the invoicing API.
//!
//! This module provides the building blocks every resource client is made of:
//! typed field tables, the wire codec and the CRUD engine that drives them.
//!
//! # Main Components
//!
//! - [`Resource`] - Trait that resource types implement to be handled by the mapper
//! - [`FieldDescriptor`] / [`ResourceDescriptor`] - Static wire metadata
//! - [`Registry`] - Type-keyed lookup of resource descriptors
//! - [`ResourceMapper`] - Generic CRUD engine (find, paged find-all, create, update, delete)
//! - [`Error`] - Common error type with a structured [`ErrorKind`]
//!
//! # Testing
//!
//! See [`mock`] module for an in-memory transport to test clients without a server.

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod mapper;
pub mod mock;
pub mod registry;
pub mod resource;

// Re-export core types for convenience
pub use codec::{FieldValue, ValueKind, WireEnum, WireValue};
pub use descriptor::{FieldDescriptor, Permissions, ResourceDescriptor};
pub use error::{Error, ErrorKind, Operation, Result};
pub use mapper::{from_xml, to_xml, ResourceMapper};
pub use registry::{Registry, RegistryBuilder};
pub use resource::{ObjectMeta, Resource};
