//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use paybox_core::PayboxError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient permissions.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - the requested state transition is not allowed.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Insufficient wallet funds.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in the smallest currency unit.
        balance: i64,
        /// Required amount in the smallest currency unit.
        required: i64,
    },

    /// The wallet is contended; the caller should retry.
    #[error("wallet busy: {0}")]
    WalletBusy(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// The payment gateway is unreachable or failing.
    #[error("gateway error: {0}")]
    Gateway(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::InsufficientFunds { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_funds",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::WalletBusy(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "wallet_busy",
                msg.clone(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Gateway(msg) => (StatusCode::BAD_GATEWAY, "gateway_error", msg.clone(), None),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PayboxError> for ApiError {
    fn from(err: PayboxError) -> Self {
        match err {
            PayboxError::InvalidAmount { .. } | PayboxError::InvalidId(_) => {
                Self::BadRequest(err.to_string())
            }
            PayboxError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            PayboxError::NotFound { entity, id } => Self::NotFound(format!("{entity}: {id}")),
            PayboxError::WalletInactive { .. }
            | PayboxError::DuplicateRefundRequest { .. }
            | PayboxError::RefundRequestNotOpen { .. }
            | PayboxError::OrderNotPaid { .. }
            | PayboxError::AlreadyRefunded { .. }
            | PayboxError::DepositFailed { .. }
            | PayboxError::DepositNotSettled { .. } => Self::Conflict(err.to_string()),
            PayboxError::ConcurrentModification { .. } => Self::WalletBusy(err.to_string()),
            PayboxError::GatewayUnavailable(msg) => Self::Gateway(msg),
            PayboxError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<paybox_store::StoreError> for ApiError {
    fn from(err: paybox_store::StoreError) -> Self {
        Self::from(PayboxError::from(err))
    }
}
