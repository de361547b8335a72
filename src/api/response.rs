//! Response types for the Payroll Engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let code = match &error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidRateTable { .. }
            | EngineError::InvalidSettings { .. } => "CONFIG_ERROR",
            EngineError::OutputError { .. } => "OUTPUT_ERROR",
            EngineError::TableYearMismatch { .. } => "UNSUPPORTED_YEAR",
            EngineError::InvalidPeriod { .. } => "INVALID_PERIOD",
            EngineError::InvalidCategory { .. } => "INVALID_CATEGORY",
            EngineError::InvalidTaxComputation { .. } => "INVALID_TAX_COMPUTATION",
            EngineError::InvalidEmployee { .. } => "INVALID_EMPLOYEE",
            EngineError::InvariantViolation { .. } => "CALCULATION_ERROR",
        };

        // The server only has tables for the year it was started with.
        let status = match (&error, error.kind()) {
            (EngineError::TableYearMismatch { .. }, _) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::Configuration | ErrorKind::Invariant) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            (_, ErrorKind::Validation | ErrorKind::Lookup) => StatusCode::BAD_REQUEST,
        };

        let error = match error.kind() {
            ErrorKind::Configuration => {
                ApiError::with_details(code, "Configuration error", message)
            }
            ErrorKind::Invariant => ApiError::with_details(code, "Calculation failed", message),
            ErrorKind::Validation | ErrorKind::Lookup => ApiError::new(code, message),
        };

        ApiErrorResponse { status, error }
    }
}
