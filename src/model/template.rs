use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::common::require_text;
use crate::framework::{Error, FieldDescriptor, ObjectMeta, Resource, Result};

wire_enum! {
    /// Document kind a template renders.
    TemplateType {
        Invoice => "INVOICE",
        Offer => "OFFER",
    }
}

wire_enum! {
    TemplateFormat {
        Doc => "DOC",
        Docx => "DOCX",
        Rtf => "RTF",
    }
}

/// Image format of a template preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbType {
    #[default]
    Png,
    Gif,
    Jpg,
}

impl ThumbType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbType::Png => "png",
            ThumbType::Gif => "gif",
            ThumbType::Jpg => "jpg",
        }
    }
}

/// A document template uploaded to the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub(crate) meta: ObjectMeta,
    pub template_type: Option<TemplateType>,
    pub format: Option<TemplateFormat>,
    pub name: Option<String>,
    base64file: Option<String>,
}

impl Template {
    pub fn new(name: impl Into<String>, template_type: TemplateType, format: TemplateFormat, file: &[u8]) -> Self {
        let mut template = Self {
            template_type: Some(template_type),
            format: Some(format),
            name: Some(name.into()),
            ..Self::default()
        };
        template.set_file(file);
        template
    }

    /// Decoded template file, `None` when the object carries no file.
    pub fn file(&self) -> Result<Option<Vec<u8>>> {
        self.base64file
            .as_deref()
            .map(|encoded| {
                STANDARD.decode(encoded.trim()).map_err(|_| Error::ValueConversion {
                    value: encoded.chars().take(32).collect(),
                    kind: "base64",
                })
            })
            .transpose()
    }

    pub fn set_file(&mut self, file: &[u8]) {
        self.base64file = Some(STANDARD.encode(file));
    }
}

static TEMPLATE_FIELDS: LazyLock<Vec<FieldDescriptor<Template>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|t: &Template| &t.meta, |t: &mut Template| &mut t.meta);
    fields.extend([
        field!(Template, "type" => template_type),
        field!(Template, "format" => format),
        field!(Template, "name" => name),
        field!(Template, "base64file" => base64file),
    ]);
    fields
});

impl Resource for Template {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &TEMPLATE_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_text(&self.name, "name")?;
        require_text(&self.base64file, "file")
    }
}
