//! Error handling for the receipt service
//!
//! Internal errors keep their full reason for logs and metrics. At the HTTP
//! boundary every decode or validation failure collapses into one generic
//! 400 body, and unknown ids into one generic 404 body.

use crate::metrics::METRICS;
use crate::model::{ErrorResponse, ReceiptId};
use crate::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

pub const INVALID_RECEIPT_MESSAGE: &str = "The receipt is invalid. Please verify input.";
pub const NOT_FOUND_MESSAGE: &str = "No receipt found for that ID.";

// =============================================================================
// ERROR CODES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Request body could not be decoded into a receipt document
    MalformedInput,
    /// Receipt decoded but failed a format check
    InvalidReceipt,
    /// No stored receipt for the requested id
    NotFound,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::MalformedInput | ErrorCode::InvalidReceipt => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Label used in metrics
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::MalformedInput => "malformed_input",
            ErrorCode::InvalidReceipt => "invalid_receipt",
            ErrorCode::NotFound => "not_found",
        }
    }

    /// Message shown to clients. Never includes field-level detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ErrorCode::MalformedInput | ErrorCode::InvalidReceipt => INVALID_RECEIPT_MESSAGE,
            ErrorCode::NotFound => NOT_FOUND_MESSAGE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category())
    }
}

// =============================================================================
// RECEIPT ERROR
// =============================================================================

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("malformed receipt body: {0}")]
    MalformedInput(String),

    #[error("receipt failed validation: {0}")]
    InvalidReceipt(#[from] ValidationError),

    #[error("no receipt stored under id {0}")]
    NotFound(ReceiptId),
}

impl ReceiptError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReceiptError::MalformedInput(_) => ErrorCode::MalformedInput,
            ReceiptError::InvalidReceipt(_) => ErrorCode::InvalidReceipt,
            ReceiptError::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Fine-grained label: the failed check for validation errors, the code
    /// category otherwise.
    pub fn reason(&self) -> &'static str {
        match self {
            ReceiptError::InvalidReceipt(err) => err.reason(),
            other => other.code().category(),
        }
    }
}

impl IntoResponse for ReceiptError {
    fn into_response(self) -> Response {
        let code = self.code();
        match &self {
            ReceiptError::NotFound(id) => {
                tracing::info!(receipt_id = %id, "points requested for unknown receipt");
            }
            other => {
                METRICS.record_rejection(other.reason());
                tracing::warn!(
                    error_code = %code,
                    reason = other.reason(),
                    detail = %other,
                    "receipt rejected"
                );
            }
        }

        let body = ErrorResponse {
            error: code.public_message().to_string(),
        };
        (code.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::AmountError;

    #[test]
    fn decode_and_validation_failures_share_status_and_message() {
        let malformed = ReceiptError::MalformedInput("expected value".to_string());
        let invalid = ReceiptError::from(ValidationError::Total(AmountError::Format(
            "10.5".to_string(),
        )));

        assert_eq!(malformed.code().status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.code().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            malformed.code().public_message(),
            invalid.code().public_message()
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ReceiptError::NotFound(ReceiptId("nope".to_string()));
        assert_eq!(err.code().status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code().public_message(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn reason_labels_validation_check() {
        let err = ReceiptError::from(ValidationError::NoItems);
        assert_eq!(err.reason(), "items");
        assert_eq!(
            ReceiptError::MalformedInput(String::new()).reason(),
            "malformed_input"
        );
    }

    #[tokio::test]
    async fn response_body_hides_detail() {
        use http_body_util::BodyExt;

        let response =
            ReceiptError::from(ValidationError::Retailer("secret!".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("secret!"), "leaked detail: {text}");

        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body, serde_json::json!({"error": INVALID_RECEIPT_MESSAGE}));
    }
}
