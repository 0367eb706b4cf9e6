//! # Field and Resource Descriptors
//!
//! A [`FieldDescriptor`] describes one mapped attribute of a resource type: its
//! wire name, whether the server owns it (read-only), its [`ValueKind`] and
//! typed accessors into the native struct. A [`ResourceDescriptor`] names the
//! URL segment and XML tags of a resource type and the operations it allows.
//!
//! # Architecture Note
//! Descriptors replace runtime type inspection with explicit tables. Each
//! resource type declares its table once (see [`Resource::fields`](super::Resource::fields)).
//! Shared field groups, like the fields every transaction carries, are declared
//! against their own struct and lifted into the owning type with
//! [`FieldDescriptor::embed`], so the mapper walks a flat list no matter how
//! deeply the data is nested.

use std::fmt;
use std::sync::Arc;

use super::codec::{FieldValue, ValueKind, WireValue};
use super::error::{Error, Operation, Result};

type ReadFn<T> = Arc<dyn Fn(&T) -> Option<FieldValue> + Send + Sync>;
type WriteFn<T> = Arc<dyn Fn(&mut T, Option<FieldValue>) -> bool + Send + Sync>;
type CopyFn<T> = Arc<dyn Fn(&T, &mut T) + Send + Sync>;

/// Metadata and accessors for one mapped field of `T`.
pub struct FieldDescriptor<T> {
    wire_name: &'static str,
    read_only: bool,
    kind: ValueKind,
    read: ReadFn<T>,
    write: WriteFn<T>,
    copy: CopyFn<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    /// Declares a writable field stored at the location `get`/`get_mut` point to.
    pub fn new<V: WireValue>(wire_name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        Self {
            wire_name,
            read_only: false,
            kind: V::KIND,
            read: Arc::new(move |item: &T| get(item).to_wire()),
            write: Arc::new(move |item: &mut T, value: Option<FieldValue>| match V::from_wire(value) {
                Some(v) => {
                    *get_mut(item) = v;
                    true
                }
                None => false,
            }),
            copy: Arc::new(move |from: &T, to: &mut T| *get_mut(to) = get(from).clone()),
        }
    }

    /// Marks the field as server-owned: never sent, always read back.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Lifts a descriptor of an embedded field group `T` into its owner `O`.
    pub fn embed<O: 'static>(self, outer: fn(&O) -> &T, outer_mut: fn(&mut O) -> &mut T) -> FieldDescriptor<O> {
        let (read, write, copy) = (self.read, self.write, self.copy);
        FieldDescriptor {
            wire_name: self.wire_name,
            read_only: self.read_only,
            kind: self.kind,
            read: Arc::new(move |item: &O| read(outer(item))),
            write: Arc::new(move |item: &mut O, value: Option<FieldValue>| write(outer_mut(item), value)),
            copy: Arc::new(move |from: &O, to: &mut O| copy(outer(from), outer_mut(to))),
        }
    }
}

impl<T> FieldDescriptor<T> {
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Current value, or `None` when the field is absent.
    pub fn get(&self, item: &T) -> Option<FieldValue> {
        (self.read)(item)
    }

    /// Stores `value`; a value of the wrong shape is a programming error.
    pub fn set(&self, item: &mut T, value: Option<FieldValue>) -> Result<()> {
        let found = value.as_ref().map_or("a null value", FieldValue::variant_name);
        if (self.write)(item, value) {
            Ok(())
        } else {
            Err(Error::UnsupportedFieldType {
                field: self.wire_name.to_string(),
                found,
            })
        }
    }

    /// Copies this field's value from `from` into `to`.
    pub fn copy(&self, from: &T, to: &mut T) {
        (self.copy)(from, to)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("wire_name", &self.wire_name)
            .field("read_only", &self.read_only)
            .field("kind", &self.kind)
            .finish()
    }
}

// =============================================================================
// Resource metadata
// =============================================================================

/// Operations a resource type accepts. Reads are always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    create: bool,
    update: bool,
    delete: bool,
}

impl Permissions {
    pub const ALL: Permissions = Permissions { create: true, update: true, delete: true };
    pub const READ_ONLY: Permissions = Permissions { create: false, update: false, delete: false };

    pub const fn without(self, op: Operation) -> Self {
        match op {
            Operation::Create => Permissions { create: false, ..self },
            Operation::Update => Permissions { update: false, ..self },
            Operation::Delete => Permissions { delete: false, ..self },
        }
    }

    pub const fn allows(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// URL segment, XML tags and permissions of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Path segment, e.g. `invoices`.
    pub resource_name: &'static str,
    /// Root tag of a single object, e.g. `invoice`.
    pub xml_singular: &'static str,
    /// Wrapper tag of a list response, e.g. `invoices`.
    pub xml_plural: &'static str,
    pub permissions: Permissions,
}

impl ResourceDescriptor {
    pub const fn new(resource_name: &'static str, xml_singular: &'static str, xml_plural: &'static str) -> Self {
        Self {
            resource_name,
            xml_singular,
            xml_plural,
            permissions: Permissions::ALL,
        }
    }

    pub const fn without(mut self, op: Operation) -> Self {
        self.permissions = self.permissions.without(op);
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.permissions = Permissions::READ_ONLY;
        self
    }

    /// Fails with [`Error::OperationNotPermitted`] unless `op` is allowed.
    pub fn check(&self, op: Operation) -> Result<()> {
        if self.permissions.allows(op) {
            Ok(())
        } else {
            Err(Error::OperationNotPermitted {
                resource: self.resource_name,
                operation: op,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::ErrorKind;

    #[derive(Default, Clone)]
    struct Inner {
        amount: f64,
    }

    #[derive(Default, Clone)]
    struct Outer {
        inner: Inner,
        label: Option<String>,
    }

    #[test]
    fn test_embedded_field_reads_and_writes_through_owner() {
        let amount = FieldDescriptor::new("amount", |i: &Inner| &i.amount, |i: &mut Inner| &mut i.amount)
            .read_only()
            .embed(|o: &Outer| &o.inner, |o: &mut Outer| &mut o.inner);

        assert!(amount.is_read_only());
        assert_eq!(amount.kind(), ValueKind::Float);

        let mut item = Outer::default();
        amount.set(&mut item, Some(FieldValue::Float(9.5))).unwrap();
        assert_eq!(item.inner.amount, 9.5);
        assert_eq!(amount.get(&item), Some(FieldValue::Float(9.5)));

        let mut other = Outer::default();
        amount.copy(&item, &mut other);
        assert_eq!(other.inner.amount, 9.5);
    }

    #[test]
    fn test_set_rejects_wrong_shape() {
        let label = FieldDescriptor::new("label", |o: &Outer| &o.label, |o: &mut Outer| &mut o.label);
        let mut item = Outer::default();

        assert_eq!(label.get(&item), None);
        let err = label.set(&mut item, Some(FieldValue::Int(1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFieldType);

        label.set(&mut item, None).unwrap();
        assert_eq!(item.label, None);
    }

    #[test]
    fn test_permissions() {
        let d = ResourceDescriptor::new("invoice-comments", "invoice-comment", "invoice-comments")
            .without(Operation::Update);
        assert!(d.check(Operation::Create).is_ok());
        assert!(d.check(Operation::Delete).is_ok());
        assert_eq!(d.check(Operation::Update).unwrap_err().kind(), ErrorKind::OperationNotPermitted);

        let users = ResourceDescriptor::new("users", "user", "users").read_only();
        assert!(!users.permissions.allows(Operation::Create));
    }
}
