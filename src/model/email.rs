//! E-mail delivery of invoices and offers.

use serde::{Deserialize, Serialize};

use crate::framework::{Error, Result};
use crate::xml::XmlElement;

/// Message the server sends with a document attached.
///
/// Recipient fields hold comma-separated address lists. They are split on
/// every comma, so an address that itself contains a comma (a quoted display
/// name, for example) cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Name of the attached PDF.
    pub filename: Option<String>,
}

impl EmailMessage {
    pub fn to(recipients: impl Into<String>) -> Self {
        Self {
            to: recipients.into(),
            ..Self::default()
        }
    }

    pub fn cc(mut self, recipients: impl Into<String>) -> Self {
        self.cc = Some(recipients.into());
        self
    }

    pub fn bcc(mut self, recipients: impl Into<String>) -> Self {
        self.bcc = Some(recipients.into());
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.from = Some(sender.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// `<email>` request body. Fails with `InvalidArgument` without a `to`
    /// recipient.
    pub fn to_xml(&self) -> Result<XmlElement> {
        let to = split_recipients(Some(self.to.as_str()));
        if to.is_empty() {
            return Err(Error::InvalidArgument("No recipient specified!".to_string()));
        }

        let mut recipients = XmlElement::new("recipients");
        for (tag, addresses) in [
            ("to", to),
            ("cc", split_recipients(self.cc.as_deref())),
            ("bcc", split_recipients(self.bcc.as_deref())),
        ] {
            for address in addresses {
                recipients.push(XmlElement::with_text(tag, address));
            }
        }

        let mut email = XmlElement::new("email").child_element(recipients);
        for (tag, value) in [
            ("from", &self.from),
            ("subject", &self.subject),
            ("body", &self.body),
            ("filename", &self.filename),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                email.push(XmlElement::with_text(tag, value));
            }
        }
        Ok(email)
    }
}

fn split_recipients(list: Option<&str>) -> Vec<&str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .collect()
}
