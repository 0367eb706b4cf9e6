use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::common::{embed_all, require_text, NumberedFields};
use crate::framework::{FieldDescriptor, ObjectMeta, Resource, Result};

/// A customer, called "client" by the invoicing API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub(crate) meta: ObjectMeta,
    pub numbered: NumberedFields,
    pub(crate) client_number: Option<String>,
    pub name: Option<String>,
    pub salutation: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub www: Option<String>,
    pub tax_number: Option<String>,
    pub vat_number: Option<String>,
    pub bank_account_owner: Option<String>,
    pub bank_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_swift: Option<String>,
    pub bank_iban: Option<String>,
    pub note: Option<String>,
    pub(crate) revenue_gross: Option<f64>,
    pub(crate) revenue_net: Option<f64>,
}

impl Customer {
    /// Customer with the address fields the server requires.
    pub fn new(street: impl Into<String>, zip: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            street: Some(street.into()),
            zip: Some(zip.into()),
            city: Some(city.into()),
            ..Self::default()
        }
    }

    pub fn client_number(&self) -> Option<&str> {
        self.client_number.as_deref()
    }

    pub fn revenue_gross(&self) -> Option<f64> {
        self.revenue_gross
    }

    pub fn revenue_net(&self) -> Option<f64> {
        self.revenue_net
    }
}

static CUSTOMER_FIELDS: LazyLock<Vec<FieldDescriptor<Customer>>> = LazyLock::new(|| {
    let mut fields = ObjectMeta::embedded(|c: &Customer| &c.meta, |c: &mut Customer| &mut c.meta);
    fields.extend(embed_all(
        NumberedFields::fields(),
        |c: &Customer| &c.numbered,
        |c: &mut Customer| &mut c.numbered,
    ));
    fields.extend([
        field!(Customer, "client_number" => client_number).read_only(),
        field!(Customer, "name" => name),
        field!(Customer, "salutation" => salutation),
        field!(Customer, "first_name" => first_name),
        field!(Customer, "last_name" => last_name),
        field!(Customer, "street" => street),
        field!(Customer, "zip" => zip),
        field!(Customer, "city" => city),
        field!(Customer, "state" => state),
        field!(Customer, "country_code" => country_code),
        field!(Customer, "phone" => phone),
        field!(Customer, "fax" => fax),
        field!(Customer, "email" => email),
        field!(Customer, "www" => www),
        field!(Customer, "tax_number" => tax_number),
        field!(Customer, "vat_number" => vat_number),
        field!(Customer, "bank_account_owner" => bank_account_owner),
        field!(Customer, "bank_number" => bank_number),
        field!(Customer, "bank_name" => bank_name),
        field!(Customer, "bank_account_number" => bank_account_number),
        field!(Customer, "bank_swift" => bank_swift),
        field!(Customer, "bank_iban" => bank_iban),
        field!(Customer, "note" => note),
        field!(Customer, "revenue_gross" => revenue_gross).read_only(),
        field!(Customer, "revenue_net" => revenue_net).read_only(),
    ]);
    fields
});

impl Resource for Customer {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &CUSTOMER_FIELDS
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn validate_create(&self) -> Result<()> {
        require_text(&self.street, "street")?;
        require_text(&self.zip, "zip")?;
        require_text(&self.city, "city")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::from_xml;
    use crate::xml::XmlElement;

    #[test]
    fn test_address_is_mandatory() {
        let mut customer = Customer::new("Main St 1", "12345", "Springfield");
        assert!(customer.validate_create().is_ok());

        customer.zip = Some(String::new());
        assert_eq!(customer.validate_create().unwrap_err().to_string(), "Missing mandatory field: zip");
    }

    #[test]
    fn test_reads_server_revenue() {
        let xml = XmlElement::parse(
            r#"<client>
                <id type="integer">4</id>
                <client_number>KD4</client_number>
                <name>Acme</name>
                <revenue_gross type="float">1190.5</revenue_gross>
                <revenue_net type="float"></revenue_net>
            </client>"#,
        )
        .unwrap();

        let customer: Customer = from_xml(&xml).unwrap();
        assert_eq!(customer.id(), 4);
        assert_eq!(customer.client_number(), Some("KD4"));
        assert_eq!(customer.name.as_deref(), Some("Acme"));
        assert_eq!(customer.revenue_gross(), Some(1190.5));
        assert_eq!(customer.revenue_net(), Some(0.0));
    }
}
