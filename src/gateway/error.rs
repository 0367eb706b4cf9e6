use thiserror::Error;

use super::job::FunctionKind;

/// Errors raised while building gateway requests or reading gateway answers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Can't add more than {max} functions to a single job!")]
    TooManyFunctions { max: usize },

    #[error("Can't add more than {max} transactions to a single function!")]
    TooManyTransactions { max: usize },

    #[error("A single function can only contain transactions of the same type ({expected}, got {found})!")]
    MixedTransactionTypes {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{transaction} is invalid for function {function}!")]
    TransactionNotAcceptable {
        function: FunctionKind,
        transaction: &'static str,
    },

    #[error("Gateway credentials are missing: {0}")]
    MissingCredentials(&'static str),

    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("Fingerprint could not be checked: {0}")]
    Fingerprint(String),

    #[error(transparent)]
    Transport(#[from] crate::framework::Error),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
