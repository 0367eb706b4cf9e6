use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::common::{embed_all, NumberedFields};
use crate::framework::{FieldDescriptor, ObjectMeta, Resource};

/// A catalogue article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub(crate) meta: ObjectMeta,
    pub numbered: NumberedFields,
    pub(crate) article_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sales_price: f64,
    pub currency_code: Option<String>,
    /// Id of the article's [`Unit`].
    pub unit_id: i64,
}

impl Article {
    pub fn new(title: impl Into<String>, sales_price: f64) -> Self {
        Self {
            title: Some(title.into()),
            sales_price,
            ..Self::default()
        }
    }

    pub fn article_number(&self) -> Option<&str> {
        self.article_number.as_deref()
    }
}

static ARTICLE_FIELDS: LazyLock<Vec<FieldDescriptor<Article>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|a: &Article| &a.meta, |a: &mut Article| &mut a.meta);
    fields.extend(embed_all(NumberedFields::fields(), |a: &Article| &a.numbered, |a: &mut Article| &mut a.numbered));
    fields.extend([
        field!(Article, "article_number" => article_number).read_only(),
        field!(Article, "title" => title),
        field!(Article, "description" => description),
        field!(Article, "sales_price" => sales_price),
        field!(Article, "currency_code" => currency_code),
        field!(Article, "unit_id" => unit_id),
    ]);
    fields
});

impl Resource for Article {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &ARTICLE_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

/// A unit of measure, e.g. "hours" or "pcs".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub(crate) meta: ObjectMeta,
    pub name: Option<String>,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

static UNIT_FIELDS: LazyLock<Vec<FieldDescriptor<Unit>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|u: &Unit| &u.meta, |u: &mut Unit| &mut u.meta);
    fields.push(field!(Unit, "name" => name));
    fields
});

impl Resource for Unit {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &UNIT_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}
