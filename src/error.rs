use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::middleware::current_request_id;

/// Errors surfaced by the gateway client, the models and the webhook verifier.
///
/// Nothing in this crate retries on its own: [`DatatransError::is_retryable`]
/// tells the caller which failures are worth another attempt.
#[derive(Debug, Error)]
pub enum DatatransError {
    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// The gateway answered with a non-2xx status.
    #[error("Gateway error {status} ({code}): {message}")]
    Gateway {
        status: u16,
        code: String,
        message: String,
    },

    /// A 2xx response body did not match the expected shape.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Webhook signature could not be verified.
    #[error("Authentication failed: {message}")]
    Authentication {
        reason: AuthFailure,
        message: String,
    },

    /// A request or model failed local validation before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, DatatransError>;

/// Why an inbound notification was not authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No `Datatrans-Signature` header at all
    MissingSignature,
    /// Header present but malformed, stale or not matching the body
    InvalidSignature,
}

impl DatatransError {
    pub fn validation(message: impl Into<String>) -> Self {
        DatatransError::Validation(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        DatatransError::Authentication {
            reason: AuthFailure::InvalidSignature,
            message: message.into(),
        }
    }

    pub fn missing_signature(message: impl Into<String>) -> Self {
        DatatransError::Authentication {
            reason: AuthFailure::MissingSignature,
            message: message.into(),
        }
    }

    /// Only transport failures may succeed when repeated unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DatatransError::TransientNetwork(_))
    }

    /// Vendor error code, for gateway rejections.
    pub fn vendor_code(&self) -> Option<&str> {
        match self {
            DatatransError::Gateway { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DatatransError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DatatransError::Decoding(err.to_string())
        } else {
            DatatransError::TransientNetwork(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for DatatransError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DatatransError::Validation(errors.to_string())
    }
}

/// Error codes returned by the webhook receiver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ErrorCode {
    #[serde(rename = "AUTH_1001")]
    InvalidSignature,
    #[serde(rename = "AUTH_1002")]
    MissingSignature,

    #[serde(rename = "VAL_3001")]
    InvalidInput,
    #[serde(rename = "VAL_3003")]
    InvalidFormat,

    #[serde(rename = "EXT_8003")]
    ExternalServiceError,
    #[serde(rename = "EXT_8002")]
    ExternalServiceTimeout,

    #[serde(rename = "INT_9999")]
    InternalServerError,
    #[serde(rename = "INT_9998")]
    ConfigurationError,
}

impl ErrorCode {
    /// Get numeric code
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InvalidSignature => 1001,
            ErrorCode::MissingSignature => 1002,
            ErrorCode::InvalidInput => 3001,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::ExternalServiceTimeout => 8002,
            ErrorCode::ExternalServiceError => 8003,
            ErrorCode::InternalServerError => 9999,
            ErrorCode::ConfigurationError => 9998,
        }
    }

    /// Get user-facing message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSignature => "Webhook signature verification failed",
            ErrorCode::MissingSignature => "Missing signature",
            ErrorCode::InvalidInput => "Invalid payload",
            ErrorCode::InvalidFormat => "Malformed payload",
            ErrorCode::ExternalServiceTimeout => "Payment gateway request timed out",
            ErrorCode::ExternalServiceError => "Payment gateway error",
            ErrorCode::InternalServerError => "Processing error",
            ErrorCode::ConfigurationError => "Configuration error",
        }
    }
}

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error type of the HTTP surface. Wraps [`DatatransError`] and renders it
/// without leaking verification details to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Datatrans(#[from] DatatransError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Datatrans(err) => match err {
                DatatransError::Authentication { reason, .. } => match reason {
                    AuthFailure::MissingSignature => ErrorCode::MissingSignature,
                    AuthFailure::InvalidSignature => ErrorCode::InvalidSignature,
                },
                DatatransError::Validation(_) => ErrorCode::InvalidInput,
                DatatransError::Decoding(_) => ErrorCode::InvalidFormat,
                DatatransError::TransientNetwork(_) => ErrorCode::ExternalServiceTimeout,
                DatatransError::Gateway { .. } => ErrorCode::ExternalServiceError,
                DatatransError::Configuration(_) => ErrorCode::ConfigurationError,
            },
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Datatrans(err) => match err {
                DatatransError::Authentication { .. } => StatusCode::UNAUTHORIZED,
                DatatransError::Validation(_) | DatatransError::Decoding(_) => {
                    StatusCode::BAD_REQUEST
                }
                DatatransError::TransientNetwork(_) => StatusCode::GATEWAY_TIMEOUT,
                DatatransError::Gateway { .. } => StatusCode::BAD_GATEWAY,
                DatatransError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Validation messages are safe to echo; everything else stays in the logs.
    fn error_details(&self) -> Option<String> {
        match self {
            ApiError::Datatrans(DatatransError::Validation(msg)) => Some(msg.clone()),
            _ => None,
        }
    }

    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());
        let status = self.status_code();
        let code = self.error_code();

        self.log_error(&request_id);

        let body = ErrorResponse {
            error: ErrorDetail {
                code,
                code_number: code.code(),
                message: code.message().to_string(),
                details: self.error_details(),
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}
