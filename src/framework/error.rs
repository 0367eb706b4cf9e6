//! Error types shared by every resource client.

use thiserror::Error;

/// Boxed cause attached to [`Error::RequestFailed`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Operations gated by a resource's permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Structured kind of an [`Error`], for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfiguration,
    MissingResourceMetadata,
    OperationNotPermitted,
    TypeMismatch,
    ValueConversion,
    UnsupportedFieldType,
    MissingField,
    InvalidArgument,
    Unauthorized,
    NotFound,
    RequestFailed,
}

/// Errors raised by the mapper, the codec and the API transport adapter.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad credential format or out-of-range setting, raised on assignment.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A resource type was used without being registered.
    #[error("Type '{0}' has no resource metadata registered!")]
    MissingResourceMetadata(&'static str),

    #[error("Resource '{resource}' does not allow {operation}!")]
    OperationNotPermitted {
        resource: &'static str,
        operation: Operation,
    },

    #[error("Type mismatch for '{field}'! Expected '{expected}', found '{found}'")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("Could not convert value '{value}' to {kind}!")]
    ValueConversion { value: String, kind: &'static str },

    #[error("Field '{field}' has no codec rule for {found}")]
    UnsupportedFieldType { field: String, found: &'static str },

    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Catch-all transport or protocol failure.
    #[error("{message}")]
    RequestFailed {
        message: String,
        /// HTTP status when the server answered at all.
        status: Option<u16>,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Error::MissingResourceMetadata(_) => ErrorKind::MissingResourceMetadata,
            Error::OperationNotPermitted { .. } => ErrorKind::OperationNotPermitted,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::ValueConversion { .. } => ErrorKind::ValueConversion,
            Error::UnsupportedFieldType { .. } => ErrorKind::UnsupportedFieldType,
            Error::MissingField(_) => ErrorKind::MissingField,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::RequestFailed { .. } => ErrorKind::RequestFailed,
        }
    }

    pub(crate) fn request_failed(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::RequestFailed {
            message: message.into(),
            status: None,
            source: source.into(),
        }
    }

    /// True when the server answered with an error status that is not an
    /// authorization problem. Deletes report these as `Ok(false)`.
    pub fn is_server_rejection(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::RequestFailed { status, .. } => status.is_some(),
            _ => false,
        }
    }
}

/// Cause attached to a [`Error::RequestFailed`] produced from an HTTP status.
#[derive(Debug, Error)]
#[error("HTTP {status}: {body}")]
pub struct HttpStatusError {
    pub status: u16,
    pub body: String,
}
