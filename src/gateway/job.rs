//! Processing requests: jobs, functions and transactions.
//!
//! A [`ProcessingRequest`] carries one or more [`Job`]s. Each job carries up to
//! ten [`Function`]s, and each function carries up to five transactions of a
//! single type. The builders enforce these limits when items are added, so a
//! request that exists can always be sent.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, instrument};
use url::Url;

use super::config::GatewayConfig;
use super::error::{GatewayError, GatewayResult};
use super::response::ProcessingResponse;
use crate::framework::error::HttpStatusError;
use crate::framework::Error;
use crate::transport::{HttpRequest, Method, Transport};
use crate::xml::XmlElement;

pub const MAX_FUNCTIONS_PER_JOB: usize = 10;
pub const MAX_TRANSACTIONS_PER_FUNCTION: usize = 5;

const XSI_NAMESPACE: &str = "http://www.w3.org/1999/XMLSchema-instance";

// =============================================================================
// Transactions
// =============================================================================

/// A transaction that can be placed inside a [`Function`].
pub trait Transaction: fmt::Debug + Send + Sync {
    /// Element name, e.g. `CC_TRANSACTION`. Transactions of one function must
    /// all share it.
    fn xml_name(&self) -> &'static str;

    fn transaction_id(&self) -> &str;

    fn to_xml(&self) -> XmlElement;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionMode {
    #[default]
    Demo,
    Live,
}

impl TransactionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMode::Demo => "demo",
            TransactionMode::Live => "live",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("demo") {
            Some(TransactionMode::Demo)
        } else if value.eq_ignore_ascii_case("live") {
            Some(TransactionMode::Live)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecurringTransactionType {
    #[default]
    Single,
    Initial,
    Repeated,
}

impl RecurringTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringTransactionType::Single => "Single",
            RecurringTransactionType::Initial => "Initial",
            RecurringTransactionType::Repeated => "Repeated",
        }
    }
}

/// Pushes `<name>value</name>` when `value` is set and non-empty.
fn push_text(parent: &mut XmlElement, name: &str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        parent.push(XmlElement::with_text(name, value));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactData {
    pub ip_address: Option<String>,
}

impl ContactData {
    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("CONTACT_DATA");
        push_text(&mut root, "IPAddress", &self.ip_address);
        root
    }
}

/// Billing address checked by the fraud screening service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Address {
    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("ADDRESS");
        push_text(&mut root, "FirstName", &self.first_name);
        push_text(&mut root, "LastName", &self.last_name);
        push_text(&mut root, "Address1", &self.address1);
        push_text(&mut root, "Address2", &self.address2);
        push_text(&mut root, "City", &self.city);
        push_text(&mut root, "ZipCode", &self.zip_code);
        push_text(&mut root, "State", &self.state);
        push_text(&mut root, "Country", &self.country);
        push_text(&mut root, "Phone", &self.phone);
        push_text(&mut root, "Email", &self.email);
        root
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpTrustCenterData {
    pub address: Option<Address>,
}

impl CorpTrustCenterData {
    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("CORPTRUSTCENTER_DATA");
        if let Some(address) = &self.address {
            root.push(address.to_xml());
        }
        root
    }
}

#[derive(Clone, Default, PartialEq)]
pub struct CreditCardData {
    pub credit_card_number: Option<String>,
    pub cvc2: Option<String>,
    pub expiration_year: Option<String>,
    pub expiration_month: Option<String>,
    pub card_holder_name: Option<String>,
    pub card_start_year: Option<String>,
    pub card_start_month: Option<String>,
    pub card_issue_number: Option<String>,
}

impl CreditCardData {
    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("CREDIT_CARD_DATA");
        push_text(&mut root, "CreditCardNumber", &self.credit_card_number);
        push_text(&mut root, "CVC2", &self.cvc2);
        push_text(&mut root, "ExpirationYear", &self.expiration_year);
        push_text(&mut root, "ExpirationMonth", &self.expiration_month);
        push_text(&mut root, "CardHolderName", &self.card_holder_name);
        push_text(&mut root, "CardStartYear", &self.card_start_year);
        push_text(&mut root, "CardStartMonth", &self.card_start_month);
        push_text(&mut root, "CardIssueNumber", &self.card_issue_number);
        root
    }
}

// Card numbers must never reach the logs.
impl fmt::Debug for CreditCardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self.credit_card_number.as_deref().map(|n| {
            let tail: String = n.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{tail}")
        });
        f.debug_struct("CreditCardData")
            .field("credit_card_number", &masked)
            .field("expiration_year", &self.expiration_year)
            .field("expiration_month", &self.expiration_month)
            .field("card_holder_name", &self.card_holder_name)
            .finish_non_exhaustive()
    }
}

/// A credit card transaction (`CC_TRANSACTION`).
#[derive(Debug, Clone, PartialEq)]
pub struct CcTransaction {
    pub mode: TransactionMode,
    pub transaction_id: String,
    /// Amount in major units, converted to minor units on the wire.
    pub amount: f64,
    pub currency_minor_units: u32,
    pub currency: Option<String>,
    pub country_code: Option<String>,
    pub usage: Option<String>,
    /// Reference to an earlier transaction, e.g. for captures and refunds.
    pub guwid: Option<String>,
    pub recurring: RecurringTransactionType,
    pub contact_data: Option<ContactData>,
    pub corp_trust_center_data: Option<CorpTrustCenterData>,
    pub credit_card_data: Option<CreditCardData>,
}

impl Default for CcTransaction {
    fn default() -> Self {
        Self {
            mode: TransactionMode::default(),
            transaction_id: String::new(),
            amount: 0.0,
            currency_minor_units: 2,
            currency: None,
            country_code: None,
            usage: None,
            guwid: None,
            recurring: RecurringTransactionType::default(),
            contact_data: None,
            corp_trust_center_data: None,
            credit_card_data: None,
        }
    }
}

impl CcTransaction {
    pub fn new(transaction_id: impl Into<String>, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount,
            currency: Some(currency.into()),
            ..Self::default()
        }
    }

    /// Amount in minor units, e.g. cents.
    pub fn minor_amount(&self) -> i64 {
        (self.amount * 10f64.powi(self.currency_minor_units as i32)).round() as i64
    }
}

impl Transaction for CcTransaction {
    fn xml_name(&self) -> &'static str {
        "CC_TRANSACTION"
    }

    fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new(self.xml_name()).attr("mode", self.mode.as_str());
        root.push(XmlElement::with_text("TransactionID", self.transaction_id.as_str()));

        if self.amount > 0.0 {
            root.push(
                XmlElement::with_text("Amount", self.minor_amount().to_string())
                    .attr("minorunits", self.currency_minor_units.to_string())
                    .attr("action", "convert"),
            );
        }
        push_text(&mut root, "Currency", &self.currency);
        push_text(&mut root, "CountryCode", &self.country_code);
        push_text(&mut root, "Usage", &self.usage);
        push_text(&mut root, "GuWID", &self.guwid);

        if let Some(data) = &self.contact_data {
            root.push(data.to_xml());
        }
        if let Some(data) = &self.corp_trust_center_data {
            root.push(data.to_xml());
        }
        if let Some(data) = &self.credit_card_data {
            root.push(data.to_xml());
        }

        if self.recurring != RecurringTransactionType::Single {
            root.push(
                XmlElement::new("RECURRING_TRANSACTION")
                    .child_element(XmlElement::with_text("Type", self.recurring.as_str())),
            );
        }
        root
    }
}

// =============================================================================
// Functions and jobs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    CcAuthorization,
    CcCapture,
    CcPurchase,
    CcRefund,
    CcBookback,
    CcQuery,
    CcReversal,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::CcAuthorization => "CC_AUTHORIZATION",
            FunctionKind::CcCapture => "CC_CAPTURE",
            FunctionKind::CcPurchase => "CC_PURCHASE",
            FunctionKind::CcRefund => "CC_REFUND",
            FunctionKind::CcBookback => "CC_BOOKBACK",
            FunctionKind::CcQuery => "CC_QUERY",
            FunctionKind::CcReversal => "CC_REVERSAL",
        }
    }

    /// Whether transactions named `xml_name` may be placed in this function.
    pub fn accepts(&self, xml_name: &str) -> bool {
        // every credit card function takes credit card transactions only
        xml_name == "CC_TRANSACTION"
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `FNC_*` element of a job.
#[derive(Debug)]
pub struct Function {
    kind: FunctionKind,
    function_id: String,
    transactions: Vec<Box<dyn Transaction>>,
}

impl Function {
    pub fn new(kind: FunctionKind, function_id: impl Into<String>) -> Self {
        Self {
            kind,
            function_id: function_id.into(),
            transactions: Vec::new(),
        }
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn function_id(&self) -> &str {
        &self.function_id
    }

    pub fn transactions(&self) -> &[Box<dyn Transaction>] {
        &self.transactions
    }

    pub fn add_transaction(&mut self, transaction: impl Transaction + 'static) -> GatewayResult<()> {
        if self.transactions.len() == MAX_TRANSACTIONS_PER_FUNCTION {
            return Err(GatewayError::TooManyTransactions {
                max: MAX_TRANSACTIONS_PER_FUNCTION,
            });
        }
        if let Some(first) = self.transactions.first() {
            if first.xml_name() != transaction.xml_name() {
                return Err(GatewayError::MixedTransactionTypes {
                    expected: first.xml_name(),
                    found: transaction.xml_name(),
                });
            }
        }
        if !self.kind.accepts(transaction.xml_name()) {
            return Err(GatewayError::TransactionNotAcceptable {
                function: self.kind,
                transaction: transaction.xml_name(),
            });
        }
        self.transactions.push(Box::new(transaction));
        Ok(())
    }

    /// Builder form of [`Function::add_transaction`].
    pub fn with_transaction(mut self, transaction: impl Transaction + 'static) -> GatewayResult<Self> {
        self.add_transaction(transaction)?;
        Ok(self)
    }

    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new(format!("FNC_{}", self.kind.as_str()));
        root.push(XmlElement::with_text("FunctionID", self.function_id.as_str()));
        for transaction in &self.transactions {
            root.push(transaction.to_xml());
        }
        root
    }
}

/// One `W_JOB` element.
#[derive(Debug)]
pub struct Job {
    job_id: String,
    business_case_signature: Option<String>,
    functions: Vec<Function>,
}

impl Job {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            business_case_signature: None,
            functions: Vec::new(),
        }
    }

    /// Overrides the configured default signature for this job.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.business_case_signature = Some(signature.into());
        self
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn add_function(&mut self, function: Function) -> GatewayResult<()> {
        if self.functions.len() == MAX_FUNCTIONS_PER_JOB {
            return Err(GatewayError::TooManyFunctions {
                max: MAX_FUNCTIONS_PER_JOB,
            });
        }
        self.functions.push(function);
        Ok(())
    }

    pub fn with_function(mut self, function: Function) -> GatewayResult<Self> {
        self.add_function(function)?;
        Ok(self)
    }

    fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("W_JOB");
        root.push(XmlElement::with_text("JobID", self.job_id.as_str()));
        root.push(XmlElement::with_text(
            "BusinessCaseSignature",
            self.business_case_signature.as_deref().unwrap_or_default(),
        ));
        for function in &self.functions {
            root.push(function.to_xml());
        }
        root
    }
}

// =============================================================================
// Request
// =============================================================================

/// A `WIRECARD_BXML` request document bound to one set of credentials.
#[derive(Debug)]
pub struct ProcessingRequest {
    url: Url,
    username: String,
    password: String,
    default_signature: Option<String>,
    jobs: Vec<Job>,
}

impl ProcessingRequest {
    /// Fails with `MissingCredentials` when the username or password is empty.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        config.require_processing()?;
        let url = Url::parse(&config.processing_url).map_err(|e| GatewayError::InvalidField {
            field: "processing_url",
            reason: e.to_string(),
        })?;
        Ok(Self {
            url,
            username: config.username.clone(),
            password: config.password.clone(),
            default_signature: config.business_case_signature.clone(),
            jobs: Vec::new(),
        })
    }

    /// Adds `job`, giving it the configured signature unless it has its own.
    pub fn add_job(&mut self, mut job: Job) {
        if job.business_case_signature.is_none() {
            job.business_case_signature = self.default_signature.clone();
        }
        self.jobs.push(job);
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.add_job(job);
        self
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// The request document, declaration included.
    pub fn to_xml(&self) -> GatewayResult<String> {
        let mut request = XmlElement::new("W_REQUEST");
        for job in &self.jobs {
            request.push(job.to_xml());
        }
        XmlElement::new("WIRECARD_BXML")
            .attr("xmlns:xsi", XSI_NAMESPACE)
            .child_element(request)
            .to_document()
            .map_err(|e| GatewayError::MalformedResponse(format!("Could not serialize request: {e}")))
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// POSTs the document and parses the gateway's answer.
    #[instrument(skip(self, transport), fields(jobs = self.jobs.len()))]
    pub async fn send(&self, transport: &dyn Transport) -> GatewayResult<ProcessingResponse> {
        let body = self.to_xml()?;
        debug!(bytes = body.len(), "Sending processing request");

        let request = HttpRequest {
            method: Method::Post,
            url: self.url.clone(),
            headers: vec![
                ("Authorization".to_string(), self.authorization()),
                ("Content-Type".to_string(), "text/xml; charset=utf-8".to_string()),
            ],
            body: Some(body.into_bytes()),
        };

        let response = transport
            .send(request)
            .await
            .map_err(|e| Error::request_failed("Processing request failed", e))?;

        if response.status == 401 {
            return Err(Error::Unauthorized("Gateway rejected the credentials!".to_string()).into());
        }
        if !response.is_success() {
            let status = response.status;
            return Err(Error::RequestFailed {
                message: format!("Gateway answered HTTP {status}"),
                status: Some(status),
                source: Box::new(HttpStatusError {
                    status,
                    body: response.body_text(),
                }),
            }
            .into());
        }

        let parsed = ProcessingResponse::parse(&response.body_text())?;
        info!(jobs = parsed.jobs().len(), "Processing response received");
        Ok(parsed)
    }
}
