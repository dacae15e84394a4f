//! Canonical error records and failure normalization.
//!
//! The analysis service reports failures in several shapes: a canonical
//! `{"error": {...}}` body, a FastAPI-style `{"detail": ...}` wrapper
//! whose payload may itself hold a canonical record, or nothing at all
//! when the request never completed. The presentation layer only ever
//! sees one shape, [`ErrorRecord`]; [`normalize`] is the total function
//! that gets it there.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Submission attempted without both inputs. Raised locally, never by
/// the service.
pub const MISSING_INPUT: &str = "MISSING_INPUT";
/// The service answered with a structured but non-canonical failure.
pub const API_ERROR: &str = "API_ERROR";
/// No structured response reached the client at all.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

/// The one failure shape shown to the user: a stable machine code, a
/// human-readable message, and optional technical detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A failure as classified at the transport boundary, before
/// normalization. Keeping the three shapes distinct here lets
/// [`normalize`] stay a total match instead of a pile of checks on
/// loose JSON.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiFailure {
    /// The body carried a canonical record at the top level.
    #[error("{0}")]
    Canonical(ErrorRecord),
    /// The body carried a `detail` payload of unknown shape.
    #[error("service detail: {0}")]
    Detail(Value),
    /// The request never produced a structured response.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

/// Collapse any failure shape into one canonical record.
///
/// Precedence, first match wins:
/// 1. a canonical record passes through untouched;
/// 2. a `detail` payload is unwrapped or degraded to API_ERROR;
/// 3. a bare transport failure becomes NETWORK_ERROR, keeping the
///    transport message as the technical detail.
pub fn normalize(failure: ApiFailure) -> ErrorRecord {
    match failure {
        ApiFailure::Canonical(record) => record,
        ApiFailure::Detail(detail) => normalize_detail(detail),
        ApiFailure::Transport { message } => ErrorRecord {
            code: NETWORK_ERROR.to_string(),
            message: "Failed to connect to server".to_string(),
            details: Some(if message.is_empty() {
                "Please ensure the backend server is running".to_string()
            } else {
                message
            }),
        },
    }
}

/// A `detail` payload may wrap a canonical record one level down (the
/// service raises its errors as `detail: {"error": {...}}`). If it
/// does, unwrap it; otherwise synthesize an API_ERROR around whatever
/// was sent, keeping a string payload as the message and the full
/// payload as the technical detail.
fn normalize_detail(detail: Value) -> ErrorRecord {
    if let Some(wrapped) = detail.get("error") {
        if let Ok(record) = serde_json::from_value::<ErrorRecord>(wrapped.clone()) {
            return record;
        }
    }
    let message = match &detail {
        Value::String(text) => text.clone(),
        _ => "Analysis failed".to_string(),
    };
    ErrorRecord {
        code: API_ERROR.to_string(),
        message,
        details: Some(detail.to_string()),
    }
}

/// The one failure synthesized before any network activity: submit was
/// called without a file or without any selected medication.
pub fn missing_input() -> ErrorRecord {
    ErrorRecord {
        code: MISSING_INPUT.to_string(),
        message: "Please select both a genomic file and at least one medication".to_string(),
        details: Some("Both inputs are required to perform the analysis".to_string()),
    }
}

/// The service answered success but broke the response contract
/// (undecodable body, or a report count that does not match the
/// submitted drug count).
pub fn protocol_violation(details: impl Into<String>) -> ErrorRecord {
    ErrorRecord {
        code: API_ERROR.to_string(),
        message: "Malformed analysis response".to_string(),
        details: Some(details.into()),
    }
}
