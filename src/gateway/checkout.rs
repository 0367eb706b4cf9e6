//! QPay payment page: the signed checkout form and the posted-back result.

use std::fmt;
use std::str::FromStr;

use quick_xml::escape::escape;
use tracing::{debug, warn};

use super::config::GatewayConfig;
use super::error::{GatewayError, GatewayResult};
use super::fingerprint::{form_value, verify_fingerprint, FingerprintBuilder};

/// Language codes accepted by the payment page.
pub mod language {
    pub const CZECH: &str = "cz";
    pub const DANISH: &str = "da";
    pub const GERMAN: &str = "de";
    pub const GREEK: &str = "el";
    pub const ENGLISH: &str = "en";
    pub const SPANISH: &str = "es";
    pub const FINNISH: &str = "fi";
    pub const FRENCH: &str = "fr";
    pub const HUNGARIAN: &str = "hu";
    pub const ITALIAN: &str = "it";
    pub const JAPANESE: &str = "jp";
    pub const DUTCH: &str = "nl";
    pub const PORTUGUESE: &str = "pg";
    pub const POLISH: &str = "pl";
    pub const RUSSIAN: &str = "ru";
    pub const SWEDISH: &str = "se";
    pub const SLOVAK: &str = "sk";
    pub const SLOVENIAN: &str = "sl";
    pub const CHINESE: &str = "zh";
}

/// Payment method pre-selected on the payment page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentType {
    /// Not sent; the shop posts its own `paymenttype` field.
    #[default]
    Undefined,
    /// Selection happens on the payment page.
    Select,
    CCard,
    /// Credit card without 3-D Secure.
    CCardMoto,
    Maestro,
    Pbx,
    Psc,
    Eps,
    Elv,
    Quick,
    /// Mobile phone billing. Requires an amount net.
    Mia,
    Idl,
    Giropay,
    PayPal,
}

impl PaymentType {
    const ALL: [PaymentType; 14] = [
        PaymentType::Undefined,
        PaymentType::Select,
        PaymentType::CCard,
        PaymentType::CCardMoto,
        PaymentType::Maestro,
        PaymentType::Pbx,
        PaymentType::Psc,
        PaymentType::Eps,
        PaymentType::Elv,
        PaymentType::Quick,
        PaymentType::Mia,
        PaymentType::Idl,
        PaymentType::Giropay,
        PaymentType::PayPal,
    ];

    /// Form value, e.g. `CCARD-MOTO`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Undefined => "UNDEFINED",
            PaymentType::Select => "SELECT",
            PaymentType::CCard => "CCARD",
            PaymentType::CCardMoto => "CCARD-MOTO",
            PaymentType::Maestro => "MAESTRO",
            PaymentType::Pbx => "PBX",
            PaymentType::Psc => "PSC",
            PaymentType::Eps => "EPS",
            PaymentType::Elv => "ELV",
            PaymentType::Quick => "QUICK",
            PaymentType::Mia => "MIA",
            PaymentType::Idl => "IDL",
            PaymentType::Giropay => "GIROPAY",
            PaymentType::PayPal => "PAYPAL",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = GatewayError;

    /// Case-insensitive; `_` and `-` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| GatewayError::InvalidField {
                field: "paymentType",
                reason: format!("unknown payment type '{s}'"),
            })
    }
}

/// A payment page request.
///
/// Build one, then post [`Checkout::form_values`] (or the hidden inputs of
/// [`Checkout::form_html`]) to the payment page. Both validate first.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub amount: f64,
    pub amount_net: Option<f64>,
    pub currency: String,
    pub payment_type: PaymentType,
    /// Bank pre-selection for EPS.
    pub financial_institution: Option<String>,
    pub language: String,
    /// Alphanumeric only, at most 255 characters.
    pub order_description: String,
    pub display_text: Option<String>,
    pub duplicate_request_check: bool,
    pub success_url: String,
    pub cancel_url: String,
    pub failure_url: String,
    pub service_url: String,
    pub confirm_url: Option<String>,
    pub image_url: Option<String>,
    pub customer_statement: Option<String>,
    /// Digits only, at most 128.
    pub order_reference: Option<String>,
    pub auto_deposit: bool,
    pub max_retries: Option<u32>,
    custom_parameters: Vec<(String, String)>,
}

impl Default for Checkout {
    fn default() -> Self {
        Self {
            amount: 0.0,
            amount_net: None,
            currency: String::new(),
            payment_type: PaymentType::default(),
            financial_institution: None,
            language: String::new(),
            order_description: String::new(),
            display_text: None,
            duplicate_request_check: true,
            success_url: String::new(),
            cancel_url: String::new(),
            failure_url: String::new(),
            service_url: String::new(),
            confirm_url: None,
            image_url: None,
            customer_statement: None,
            order_reference: None,
            auto_deposit: false,
            max_retries: None,
            custom_parameters: Vec::new(),
        }
    }
}

fn require(value: &str, field: &'static str) -> GatewayResult<()> {
    if value.is_empty() {
        return Err(GatewayError::MissingField(field));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> GatewayError {
    GatewayError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Checkout {
    pub fn new(amount: f64, currency: impl Into<String>, order_description: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            order_description: order_description.into(),
            ..Self::default()
        }
    }

    /// Sets a parameter the payment page echoes back, replacing an earlier
    /// value of the same name.
    pub fn set_custom_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.custom_parameters.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.custom_parameters.push((name, value)),
        }
    }

    pub fn custom_parameter(&self, name: &str) -> Option<&str> {
        form_value(&self.custom_parameters, name)
    }

    /// Checks every field against the payment page's rules.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.amount <= 0.0 {
            return Err(invalid("amount", "must be greater than 0"));
        }
        require(&self.currency, "currency")?;
        require(&self.language, "language")?;
        require(&self.order_description, "orderDescription")?;
        require(&self.success_url, "successURL")?;
        require(&self.cancel_url, "cancelURL")?;
        require(&self.failure_url, "failureURL")?;
        require(&self.service_url, "serviceURL")?;

        if !self.order_description.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("orderDescription", "only alphanumeric characters are allowed"));
        }
        if self.order_description.chars().count() > 255 {
            return Err(invalid("orderDescription", "at most 255 characters are allowed"));
        }
        if let Some(reference) = non_empty(&self.order_reference) {
            if !reference.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("orderReference", "only numeric characters are allowed"));
            }
            if reference.len() > 128 {
                return Err(invalid("orderReference", "at most 128 digits are allowed"));
            }
        }
        if self.service_url.chars().count() > 255 {
            return Err(invalid("serviceURL", "at most 255 characters are allowed"));
        }
        if non_empty(&self.customer_statement).is_some_and(|s| s.chars().count() > 254) {
            return Err(invalid("customerStatement", "at most 254 characters are allowed"));
        }
        if self.payment_type == PaymentType::Mia && self.amount_net.is_none() {
            return Err(GatewayError::MissingField("amount_net"));
        }
        Ok(())
    }

    /// Signed form values, in the order the payment page fingerprints them.
    pub fn form_values(&self, config: &GatewayConfig) -> GatewayResult<Vec<(String, String)>> {
        config.require_qpay()?;
        self.validate()?;

        let mut builder = FingerprintBuilder::new(&config.customer_secret);
        for (name, value) in &self.custom_parameters {
            builder.add_value(name, value);
        }

        builder.add_value("customerId", &config.customer_id);
        if let Some(shop_id) = non_empty(&config.shop_id) {
            builder.add_value("shopId", shop_id);
        }
        builder.add_value("amount", &format!("{:.2}", self.amount));
        if let Some(amount_net) = self.amount_net {
            builder.add_value("amount_net", &format!("{amount_net:.2}"));
        }
        builder.add_value("currency", &self.currency);
        if self.payment_type != PaymentType::Undefined {
            builder.add_value("paymenttype", self.payment_type.as_str());
        }
        if let Some(institution) = non_empty(&self.financial_institution) {
            builder.add_value("financialInstitution", institution);
        }
        builder.add_value("language", &self.language);
        builder.add_value("orderDescription", &self.order_description);
        if let Some(text) = non_empty(&self.display_text) {
            builder.add_value("displayText", text);
        }
        builder.add_value("successURL", &self.success_url);
        builder.add_value("cancelURL", &self.cancel_url);
        builder.add_value("failureURL", &self.failure_url);
        builder.add_value("serviceURL", &self.service_url);
        if let Some(url) = non_empty(&self.confirm_url) {
            builder.add_value("confirmURL", url);
        }
        if let Some(url) = non_empty(&self.image_url) {
            builder.add_value("imageURL", url);
        }
        if self.duplicate_request_check {
            builder.add_value("duplicateRequestCheck", "yes");
        }
        if self.auto_deposit {
            builder.add_value("autoDeposit", "yes");
        }
        if let Some(retries) = self.max_retries {
            builder.add_value("maxRetries", &retries.to_string());
        }

        let form = builder.into_form();
        debug!(fields = form.len(), payment_type = %self.payment_type, "Checkout form built");
        Ok(form)
    }

    /// The form values as hidden `<input>` elements, one per line.
    pub fn form_html(&self, config: &GatewayConfig) -> GatewayResult<String> {
        let html = self
            .form_values(config)?
            .iter()
            .map(|(name, value)| {
                format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\" />\n",
                    escape(name.as_str()),
                    escape(value.as_str())
                )
            })
            .collect();
        Ok(html)
    }
}

// =============================================================================
// Response
// =============================================================================

/// Fields that the payment page itself posts back. Anything else is a custom
/// parameter of the original checkout.
const RESERVED_PARAMETERS: &[&str] = &[
    "paymentState",
    "amount",
    "currency",
    "financialInstitution",
    "language",
    "orderNumber",
    "anonymousPan",
    "authenticated",
    "message",
    "expiry",
    "cardholder",
    "maskedPan",
    "gatewayReferenceNumber",
    "gatewayContractNumber",
    "idealConsumerName",
    "idealConsumerCity",
    "idealConsumerAccountNumber",
    "paypalPayerID",
    "paypalPayerEmail",
    "paypalPayerLastName",
    "paypalPayerFirstName",
    "responseFingerprint",
    "responseFingerprintOrder",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Success,
    Cancel,
    Failure,
}

/// Details of a successful payment.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSuccess {
    pub amount: f64,
    pub currency: Option<String>,
    pub payment_type: PaymentType,
    pub financial_institution: Option<String>,
    pub language: Option<String>,
    /// Uniquely identifies the payment.
    pub order_number: Option<String>,
    pub anonymous_pan: Option<String>,
    pub authenticated: Option<bool>,
    pub message: Option<String>,
    /// Card expiry as `MM/YYYY`.
    pub expiry: Option<String>,
    pub cardholder: Option<String>,
    pub masked_pan: Option<String>,
    /// Usable as GuWID on later processing requests.
    pub gateway_reference_number: Option<String>,
    /// Usable as business case signature on later processing requests.
    pub gateway_contract_number: Option<String>,
    pub ideal_consumer_name: Option<String>,
    pub ideal_consumer_city: Option<String>,
    pub ideal_consumer_account_number: Option<String>,
    pub paypal_payer_id: Option<String>,
    pub paypal_payer_email: Option<String>,
    pub paypal_payer_last_name: Option<String>,
    pub paypal_payer_first_name: Option<String>,
    /// Whether the response fingerprint matched.
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Success(Box<CheckoutSuccess>),
    Failure { message: Option<String> },
    Cancel,
}

/// What the payment page posted back to one of the shop's URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutResponse {
    pub outcome: CheckoutOutcome,
    /// Non-reserved fields, in posting order.
    pub custom_parameters: Vec<(String, String)>,
}

impl CheckoutResponse {
    /// Parses the posted form. A successful payment has its fingerprint
    /// checked; see [`CheckoutSuccess::is_valid`].
    pub fn from_form(config: &GatewayConfig, form: &[(String, String)]) -> GatewayResult<Self> {
        config.require_qpay()?;

        let text = |name: &str| form_value(form, name).map(str::to_string);
        let outcome = match form_value(form, "paymentState") {
            Some("SUCCESS") => {
                let raw_amount = form_value(form, "amount").ok_or(GatewayError::MissingField("amount"))?;
                let amount = raw_amount
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| invalid("amount", format!("'{raw_amount}' is not a number")))?;
                let payment_type = form_value(form, "paymentType")
                    .ok_or(GatewayError::MissingField("paymentType"))?
                    .parse::<PaymentType>()?;
                let is_valid = verify_fingerprint(&config.customer_secret, form)?;
                if !is_valid {
                    warn!("Checkout response fingerprint mismatch");
                }

                CheckoutOutcome::Success(Box::new(CheckoutSuccess {
                    amount,
                    currency: text("currency"),
                    payment_type,
                    financial_institution: text("financialInstitution"),
                    language: text("language"),
                    order_number: text("orderNumber"),
                    anonymous_pan: text("anonymousPan"),
                    authenticated: form_value(form, "authenticated").map(|v| v.eq_ignore_ascii_case("yes")),
                    message: text("message"),
                    expiry: text("expiry"),
                    cardholder: text("cardholder"),
                    masked_pan: text("maskedPan"),
                    gateway_reference_number: text("gatewayReferenceNumber"),
                    gateway_contract_number: text("gatewayContractNumber"),
                    ideal_consumer_name: text("idealConsumerName"),
                    ideal_consumer_city: text("idealConsumerCity"),
                    ideal_consumer_account_number: text("idealConsumerAccountNumber"),
                    paypal_payer_id: text("paypalPayerID"),
                    paypal_payer_email: text("paypalPayerEmail"),
                    paypal_payer_last_name: text("paypalPayerLastName"),
                    paypal_payer_first_name: text("paypalPayerFirstName"),
                    is_valid,
                }))
            }
            Some("FAILURE") => CheckoutOutcome::Failure {
                message: text("message"),
            },
            Some("CANCEL") => CheckoutOutcome::Cancel,
            Some(other) => {
                return Err(GatewayError::MalformedResponse(format!("unknown paymentState '{other}'")));
            }
            None => return Err(GatewayError::MalformedResponse("paymentState is missing".to_string())),
        };

        let custom_parameters = form
            .iter()
            .filter(|(k, _)| !RESERVED_PARAMETERS.contains(&k.as_str()))
            .cloned()
            .collect();

        Ok(Self {
            outcome,
            custom_parameters,
        })
    }

    pub fn payment_state(&self) -> PaymentState {
        match self.outcome {
            CheckoutOutcome::Success(_) => PaymentState::Success,
            CheckoutOutcome::Failure { .. } => PaymentState::Failure,
            CheckoutOutcome::Cancel => PaymentState::Cancel,
        }
    }

    pub fn custom_parameter(&self, name: &str) -> Option<&str> {
        form_value(&self.custom_parameters, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout() -> Checkout {
        Checkout {
            language: language::GERMAN.into(),
            success_url: "https://shop.example/success".into(),
            cancel_url: "https://shop.example/cancel".into(),
            failure_url: "https://shop.example/failure".into(),
            service_url: "https://shop.example/service".into(),
            ..Checkout::new(12.5, "EUR", "Order4711")
        }
    }

    fn keys(form: &[(String, String)]) -> Vec<&str> {
        form.iter().map(|(k, _)| k.as_str()).collect()
    }

    fn pairs(values: &[(&str, &str)]) -> Vec<(String, String)> {
        values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_payment_type_names() {
        assert_eq!(PaymentType::CCardMoto.as_str(), "CCARD-MOTO");
        assert_eq!("ccard_moto".parse::<PaymentType>().unwrap(), PaymentType::CCardMoto);
        assert_eq!("PayPal".parse::<PaymentType>().unwrap(), PaymentType::PayPal);
        assert!("BITCOIN".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_form_values_order() {
        let mut checkout = checkout();
        checkout.payment_type = PaymentType::CCard;
        checkout.max_retries = Some(3);
        checkout.set_custom_parameter("basket", "42");

        let config = GatewayConfig {
            shop_id: Some("web".into()),
            ..GatewayConfig::demo()
        };
        let form = checkout.form_values(&config).unwrap();

        assert_eq!(
            keys(&form),
            vec![
                "basket",
                "customerId",
                "shopId",
                "amount",
                "currency",
                "paymenttype",
                "language",
                "orderDescription",
                "successURL",
                "cancelURL",
                "failureURL",
                "serviceURL",
                "duplicateRequestCheck",
                "maxRetries",
                "requestFingerprintOrder",
                "requestFingerprint",
            ]
        );
        assert_eq!(form_value(&form, "amount"), Some("12.50"));
        assert_eq!(form_value(&form, "paymenttype"), Some("CCARD"));
        assert_eq!(
            form_value(&form, "requestFingerprintOrder").unwrap(),
            "secret,basket,customerId,shopId,amount,currency,paymenttype,language,orderDescription,\
             successURL,cancelURL,failureURL,serviceURL,duplicateRequestCheck,maxRetries,requestFingerprintOrder"
        );
    }

    #[test]
    fn test_fingerprint_covers_all_values() {
        let config = GatewayConfig::demo();
        let form = checkout().form_values(&config).unwrap();

        let order = form_value(&form, "requestFingerprintOrder").unwrap();
        let mut seed = String::new();
        for key in order.split(',') {
            match key {
                "secret" => seed.push_str(&config.customer_secret),
                "requestFingerprintOrder" => seed.push_str(order),
                other => seed.push_str(form_value(&form, other).unwrap()),
            }
        }
        assert_eq!(
            form_value(&form, "requestFingerprint").unwrap(),
            format!("{:x}", md5::compute(seed))
        );
    }

    #[test]
    fn test_validation() {
        let config = GatewayConfig::demo();

        let zero = Checkout { amount: 0.0, ..checkout() };
        assert!(matches!(zero.form_values(&config), Err(GatewayError::InvalidField { field: "amount", .. })));

        let no_url = Checkout { failure_url: String::new(), ..checkout() };
        assert!(matches!(no_url.validate(), Err(GatewayError::MissingField("failureURL"))));

        let spaces = Checkout { order_description: "Order 4711".into(), ..checkout() };
        assert!(matches!(spaces.validate(), Err(GatewayError::InvalidField { field: "orderDescription", .. })));

        let reference = Checkout { order_reference: Some("A1".into()), ..checkout() };
        assert!(matches!(reference.validate(), Err(GatewayError::InvalidField { field: "orderReference", .. })));

        let statement = Checkout { customer_statement: Some("x".repeat(255)), ..checkout() };
        assert!(statement.validate().is_err());

        let mia = Checkout { payment_type: PaymentType::Mia, ..checkout() };
        assert!(matches!(mia.validate(), Err(GatewayError::MissingField("amount_net"))));
        let mia = Checkout { amount_net: Some(10.5), ..mia };
        assert!(mia.validate().is_ok());

        assert!(matches!(
            checkout().form_values(&GatewayConfig::default()),
            Err(GatewayError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_form_html_escapes_values() {
        let mut checkout = checkout();
        checkout.set_custom_parameter("note", "a\"b<c>");
        let html = checkout.form_html(&GatewayConfig::demo()).unwrap();
        assert!(html.starts_with("<input type=\"hidden\" name=\"note\" value=\"a&quot;b&lt;c&gt;\" />\n"));
        assert!(html.contains("name=\"requestFingerprint\""));
    }

    #[test]
    fn test_success_response() {
        let config = GatewayConfig::demo();
        let seed = format!("{}SUCCESS12.50EUR", config.customer_secret);
        let fingerprint = format!("{:x}", md5::compute(seed));
        let form = pairs(&[
            ("paymentState", "SUCCESS"),
            ("amount", "12.50"),
            ("currency", "EUR"),
            ("paymentType", "CCARD-MOTO"),
            ("orderNumber", "5472113"),
            ("authenticated", "Yes"),
            ("basket", "42"),
            ("responseFingerprintOrder", "secret,paymentState,amount,currency"),
            ("responseFingerprint", &fingerprint),
        ]);

        let response = CheckoutResponse::from_form(&config, &form).unwrap();
        assert_eq!(response.payment_state(), PaymentState::Success);
        let CheckoutOutcome::Success(success) = &response.outcome else {
            panic!("expected success");
        };
        assert!(success.is_valid);
        assert_eq!(success.amount, 12.5);
        assert_eq!(success.payment_type, PaymentType::CCardMoto);
        assert_eq!(success.order_number.as_deref(), Some("5472113"));
        assert_eq!(success.authenticated, Some(true));
        assert_eq!(response.custom_parameter("basket"), Some("42"));
        assert!(response.custom_parameter("amount").is_none());
    }

    #[test]
    fn test_failure_and_cancel_responses() {
        let config = GatewayConfig::demo();

        let failure = CheckoutResponse::from_form(
            &config,
            &pairs(&[("paymentState", "FAILURE"), ("message", "Card declined"), ("basket", "42")]),
        )
        .unwrap();
        assert_eq!(
            failure.outcome,
            CheckoutOutcome::Failure {
                message: Some("Card declined".into())
            }
        );
        assert_eq!(failure.custom_parameters, pairs(&[("basket", "42")]));

        let cancel = CheckoutResponse::from_form(&config, &pairs(&[("paymentState", "CANCEL")])).unwrap();
        assert_eq!(cancel.payment_state(), PaymentState::Cancel);

        assert!(matches!(
            CheckoutResponse::from_form(&config, &pairs(&[("paymentState", "PENDING")])),
            Err(GatewayError::MalformedResponse(_))
        ));
    }
}
