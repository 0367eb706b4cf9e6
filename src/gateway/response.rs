//! Parsed answers of the processing gateway.
//!
//! The answer mirrors the request: `W_RESPONSE/W_JOB` holds `FNC_*` elements,
//! which hold `*_TRANSACTION` elements, each with a `PROCESSING_STATUS`.

use chrono::NaiveDateTime;

use super::error::{GatewayError, GatewayResult};
use super::job::TransactionMode;
use crate::xml::XmlElement;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionResult {
    Ack,
    Nok,
    Pending,
}

impl FunctionResult {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ACK" => Some(FunctionResult::Ack),
            "NOK" => Some(FunctionResult::Nok),
            "PENDING" => Some(FunctionResult::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseErrorType {
    Rejected,
    DataError,
    SystemError,
    ClientError,
}

impl ResponseErrorType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "REJECTED" => Some(ResponseErrorType::Rejected),
            "DATA_ERROR" => Some(ResponseErrorType::DataError),
            "SYSTEM_ERROR" => Some(ResponseErrorType::SystemError),
            "CLIENT_ERROR" => Some(ResponseErrorType::ClientError),
            _ => None,
        }
    }
}

/// Why the gateway declined a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseError {
    pub error_type: ResponseErrorType,
    pub number: i32,
    pub message: Option<String>,
    pub advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStatus {
    /// Gateway-wide id of the transaction, used to reference it later.
    pub guwid: String,
    pub authorization_code: Option<String>,
    pub result: FunctionResult,
    pub timestamp: NaiveDateTime,
    /// Present only when `result` is [`FunctionResult::Nok`].
    pub error: Option<ResponseError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResponse {
    pub mode: Option<TransactionMode>,
    pub transaction_id: String,
    pub status: ProcessingStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    pub function_id: String,
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobResponse {
    pub job_id: String,
    pub functions: Vec<FunctionResponse>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingResponse {
    jobs: Vec<JobResponse>,
}

fn malformed(message: impl Into<String>) -> GatewayError {
    GatewayError::MalformedResponse(message.into())
}

/// Trimmed text of the mandatory child `name`.
fn required_text<'a>(element: &'a XmlElement, name: &str) -> GatewayResult<&'a str> {
    element
        .child_text(name)
        .map(str::trim)
        .ok_or_else(|| malformed(format!("{} has no {name}", element.name())))
}

fn optional_text(element: &XmlElement, name: &str) -> Option<String> {
    element
        .child_text(name)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl ProcessingResponse {
    /// Parses a `WIRECARD_BXML` answer document.
    pub fn parse(document: &str) -> GatewayResult<Self> {
        let root = XmlElement::parse(document).map_err(|e| malformed(e.to_string()))?;
        let response = root
            .child("W_RESPONSE")
            .ok_or_else(|| malformed("document has no W_RESPONSE"))?;

        let jobs = response
            .children_named("W_JOB")
            .map(parse_job)
            .collect::<GatewayResult<Vec<_>>>()?;
        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[JobResponse] {
        &self.jobs
    }

    /// Status of one transaction, addressed by the ids given in the request.
    pub fn find_status(&self, job_id: &str, function_id: &str, transaction_id: &str) -> Option<&ProcessingStatus> {
        self.jobs
            .iter()
            .find(|j| j.job_id == job_id)?
            .functions
            .iter()
            .find(|f| f.function_id == function_id)?
            .transactions
            .iter()
            .find(|t| t.transaction_id == transaction_id)
            .map(|t| &t.status)
    }
}

fn parse_job(element: &XmlElement) -> GatewayResult<JobResponse> {
    let functions = element
        .children()
        .iter()
        .filter(|c| c.name().starts_with("FNC_"))
        .map(parse_function)
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(JobResponse {
        job_id: optional_text(element, "JobID").unwrap_or_default(),
        functions,
    })
}

fn parse_function(element: &XmlElement) -> GatewayResult<FunctionResponse> {
    let transactions = element
        .children()
        .iter()
        .filter(|c| c.name().ends_with("_TRANSACTION"))
        .map(parse_transaction)
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(FunctionResponse {
        function_id: optional_text(element, "FunctionID").unwrap_or_default(),
        transactions,
    })
}

fn parse_transaction(element: &XmlElement) -> GatewayResult<TransactionResponse> {
    let mode = match element.attribute("mode") {
        Some(value) => Some(
            TransactionMode::parse(value).ok_or_else(|| malformed(format!("unknown transaction mode '{value}'")))?,
        ),
        None => None,
    };
    let status = element
        .child("PROCESSING_STATUS")
        .ok_or_else(|| malformed(format!("{} has no PROCESSING_STATUS", element.name())))?;

    Ok(TransactionResponse {
        mode,
        transaction_id: required_text(element, "TransactionID")?.to_string(),
        status: parse_status(status)?,
    })
}

fn parse_status(element: &XmlElement) -> GatewayResult<ProcessingStatus> {
    let raw_result = required_text(element, "FunctionResult")?;
    let result = FunctionResult::parse(raw_result)
        .ok_or_else(|| malformed(format!("unknown function result '{raw_result}'")))?;

    let raw_timestamp = required_text(element, "TimeStamp")?;
    let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT)
        .map_err(|e| malformed(format!("bad timestamp '{raw_timestamp}': {e}")))?;

    let error = match element.child("ERROR") {
        Some(error) if result == FunctionResult::Nok => Some(parse_error(error)?),
        _ => None,
    };

    Ok(ProcessingStatus {
        guwid: required_text(element, "GuWID")?.to_string(),
        authorization_code: optional_text(element, "AuthorizationCode"),
        result,
        timestamp,
        error,
    })
}

fn parse_error(element: &XmlElement) -> GatewayResult<ResponseError> {
    let raw_type = required_text(element, "Type")?;
    let raw_number = required_text(element, "Number")?;
    Ok(ResponseError {
        error_type: ResponseErrorType::parse(raw_type)
            .ok_or_else(|| malformed(format!("unknown error type '{raw_type}'")))?,
        number: raw_number
            .parse()
            .map_err(|_| malformed(format!("bad error number '{raw_number}'")))?,
        message: optional_text(element, "Message"),
        advice: optional_text(element, "Advice"),
    })
}
