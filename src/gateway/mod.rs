//! # Payment Gateway
//!
//! Two ways of taking card payments:
//!
//! - **Processing** ([`job`], [`response`]): server-to-server XML requests.
//!   A [`ProcessingRequest`] bundles [`Job`]s of [`Function`]s of
//!   transactions, is POSTed with basic authentication and answers with a
//!   [`ProcessingResponse`] holding one [`ProcessingStatus`] per transaction.
//! - **QPay** ([`checkout`], [`fingerprint`]): the hosted payment page. A
//!   [`Checkout`] renders a signed form, the page posts the outcome back and
//!   [`CheckoutResponse::from_form`] reads it, checking the fingerprint.
//!
//! Credentials for both live in one [`GatewayConfig`]. HTTP goes through the
//! same [`Transport`](crate::transport::Transport) seam as the invoicing
//! clients, so tests use [`MockTransport`](crate::framework::mock::MockTransport).
//!
//! ```ignore
//! let purchase = Function::new(FunctionKind::CcPurchase, "purchase")
//!     .with_transaction(CcTransaction::new("tx-1", 19.99, "EUR"))?;
//! let request = ProcessingRequest::new(&config)?
//!     .with_job(Job::new("job-1").with_function(purchase)?);
//!
//! let response = request.send(&HttpTransport::new()?).await?;
//! match response.find_status("job-1", "purchase", "tx-1") {
//!     Some(status) if status.result == FunctionResult::Ack => info!(guwid = %status.guwid, "Paid"),
//!     other => warn!(?other, "Not paid"),
//! }
//! ```

pub mod checkout;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod job;
pub mod response;

pub use checkout::{language, Checkout, CheckoutOutcome, CheckoutResponse, CheckoutSuccess, PaymentState, PaymentType};
pub use config::{GatewayConfig, DEFAULT_PROCESSING_URL};
pub use error::{GatewayError, GatewayResult};
pub use fingerprint::{verify_fingerprint, FingerprintBuilder};
pub use job::{
    Address, CcTransaction, ContactData, CorpTrustCenterData, CreditCardData, Function, FunctionKind, Job,
    ProcessingRequest, RecurringTransactionType, Transaction, TransactionMode,
};
pub use response::{
    FunctionResponse, FunctionResult, JobResponse, ProcessingResponse, ProcessingStatus, ResponseError,
    ResponseErrorType, TransactionResponse,
};
