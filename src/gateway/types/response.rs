//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError` / `ApiResult`: handler-level error plumbing
//! - `error_codes`: Standard error code constants

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::wallet::WalletError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Handler error plumbing
// ============================================================================

/// Handler result: JSON envelope on success, (status, envelope) on error
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// An error response carrying an HTTP status plus a stable numeric code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            msg,
        )
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, msg)
    }

    pub fn not_found(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    /// Convenience for `return ApiError::...(..).into_err();`
    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Validation(msg) => ApiError::bad_request(msg),
            WalletError::WalletNotFound => ApiError::not_found(
                error_codes::WALLET_NOT_FOUND,
                "wallet not found",
            ),
            WalletError::FrozenWallet(_) => ApiError::new(
                StatusCode::FORBIDDEN,
                error_codes::WALLET_FROZEN,
                err.to_string(),
            ),
            WalletError::InsufficientFunds => ApiError::new(
                StatusCode::BAD_REQUEST,
                error_codes::INSUFFICIENT_BALANCE,
                "insufficient funds",
            ),
            WalletError::RecipientNotFound(email) => ApiError::not_found(
                error_codes::RECIPIENT_NOT_FOUND,
                format!("recipient not found: {}", email),
            ),
            WalletError::TransactionNotFound(id) => ApiError::not_found(
                error_codes::TRANSACTION_NOT_FOUND,
                format!("transaction not found: {}", id),
            ),
            WalletError::InvalidStatusTransition { .. } => ApiError::new(
                StatusCode::CONFLICT,
                error_codes::INVALID_STATUS_TRANSITION,
                err.to_string(),
            ),
            WalletError::Storage(e) => {
                // Storage details never leak across the boundary
                tracing::error!("storage error in ledger operation: {}", e);
                ApiError::internal("internal error")
            }
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const WALLET_FROZEN: i32 = 1003;
    pub const INVALID_STATUS_TRANSITION: i32 = 1004;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;

    // Resource errors (4xxx)
    pub const WALLET_NOT_FOUND: i32 = 4001;
    pub const TRANSACTION_NOT_FOUND: i32 = 4002;
    pub const RECIPIENT_NOT_FOUND: i32 = 4003;
    pub const FORBIDDEN: i32 = 4030;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::types::TransactionStatus;

    #[test]
    fn test_success_envelope() {
        let resp = ApiResponse::success(42);
        assert_eq!(resp.code, 0);
        assert_eq!(resp.msg, "ok");
        assert_eq!(resp.data, Some(42));
    }

    #[test]
    fn test_error_envelope_has_no_data() {
        let resp = ApiResponse::<()>::error(error_codes::INVALID_PARAMETER, "bad amount");
        assert_eq!(resp.code, 1001);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_wallet_error_mapping() {
        let e = ApiError::from(WalletError::InsufficientFunds);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, error_codes::INSUFFICIENT_BALANCE);

        let e = ApiError::from(WalletError::WalletNotFound);
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.code, error_codes::WALLET_NOT_FOUND);

        let e = ApiError::from(WalletError::FrozenWallet("wallet"));
        assert_eq!(e.status, StatusCode::FORBIDDEN);
        assert_eq!(e.code, error_codes::WALLET_FROZEN);

        let e = ApiError::from(WalletError::InvalidStatusTransition {
            from: TransactionStatus::Completed,
            to: TransactionStatus::Failed,
        });
        assert_eq!(e.status, StatusCode::CONFLICT);
        assert_eq!(e.code, error_codes::INVALID_STATUS_TRANSITION);
    }

    #[test]
    fn test_storage_error_does_not_leak_details() {
        let e = ApiError::from(WalletError::Storage(sqlx::Error::PoolTimedOut));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.msg, "internal error");
    }
}
