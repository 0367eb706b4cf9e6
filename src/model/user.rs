use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::framework::{FieldDescriptor, ObjectMeta, Resource};

/// An account user. Users are managed in the web interface; the API only
/// reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub(crate) meta: ObjectMeta,
    pub(crate) email: Option<String>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
}

impl User {
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }
}

static USER_FIELDS: LazyLock<Vec<FieldDescriptor<User>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|u: &User| &u.meta, |u: &mut User| &mut u.meta);
    fields.extend([
        field!(User, "email" => email).read_only(),
        field!(User, "first_name" => first_name).read_only(),
        field!(User, "last_name" => last_name).read_only(),
    ]);
    fields
});

impl Resource for User {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &USER_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}
