//! Client-facing error and response envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error as reported to ledger clients
///
/// `details` carries structured context such as the audit record id or
/// the entity type involved.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the default message of `code`
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

/// Response envelope: `code` 0 with `data` on success, the error code
/// with `message`/`details` on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        err.clone().into()
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_and_status() {
        let err = AppError::new(ErrorCode::AlreadyUndone);
        assert_eq!(err.message, "Audit record has already been undone");
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.category(), ErrorCategory::Audit);
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::new(ErrorCode::AuditRecordNotFound)
            .with_detail("record_id", 42)
            .with_detail("entity_type", "expense");

        let details = err.details.unwrap();
        assert_eq!(details["record_id"], 42);
        assert_eq!(details["entity_type"], "expense");
    }

    #[test]
    fn test_error_envelope() {
        let err = AppError::new(ErrorCode::UndoNotSupported).with_detail("action", "undo");
        let response = ApiResponse::<()>::error(&err);

        assert_eq!(response.code, Some(4003));
        assert!(!response.is_success());
        assert!(response.data.is_none());
        assert!(response.details.is_some());
    }

    #[test]
    fn test_success_envelope_serialization() {
        let response = ApiResponse::success(12.5);
        assert!(response.is_success());
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":0"));
        assert!(json.contains("\"data\":12.5"));
        assert!(!json.contains("details"));
    }
}
