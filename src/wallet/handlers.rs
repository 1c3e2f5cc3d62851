//! Wallet and transaction HTTP handlers.
//!
//! Thin boundary layer: deserialize + validate, resolve the authenticated
//! caller, delegate to the services, wrap in the unified envelope.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::types::{Transaction, TransactionStatus, Wallet};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, StrictAmount, error_codes, ok};
use crate::user_auth::AuthUser;

// --- Requests ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct FundRequest {
    /// Amount to credit - format validated by StrictAmount
    #[schema(value_type = String, example = "500.00")]
    pub amount: StrictAmount,
    #[schema(example = "card")]
    pub payment_method: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Amount to reserve - format validated by StrictAmount
    #[schema(value_type = String, example = "300.00")]
    pub amount: StrictAmount,
    #[schema(example = "0123456789")]
    pub bank_account_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    /// Amount to transfer - format validated by StrictAmount
    #[schema(value_type = String, example = "200.00")]
    pub amount: StrictAmount,
    #[validate(email)]
    #[schema(example = "recipient@example.com")]
    pub recipient_email: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// Settlement callback payload from the payment-rail integration
#[derive(Debug, Deserialize, ToSchema)]
pub struct SettlementRequest {
    pub transaction_id: String,
    /// Target status: "completed" or "failed"
    #[schema(example = "completed")]
    pub status: String,
}

// --- Responses ---

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct BalanceData {
    #[schema(value_type = String, example = "1000.00")]
    pub balance: Decimal,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct PendingData {
    #[schema(value_type = String, example = "300.00")]
    pub pending_amount: Decimal,
}

// --- Wallet handlers ---

/// Get available balance
///
/// GET /api/v1/wallet/balance
#[utoipa::path(
    get,
    path = "/api/v1/wallet/balance",
    responses(
        (status = 200, description = "Current available balance"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<BalanceData> {
    let balance = state.wallet_service.balance(user.user_id).await?;
    ok(BalanceData { balance })
}

/// Get pending (reserved) amount
///
/// GET /api/v1/wallet/pending
#[utoipa::path(
    get,
    path = "/api/v1/wallet/pending",
    responses(
        (status = 200, description = "Funds reserved for in-flight withdrawals"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn get_pending(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PendingData> {
    let pending_amount = state.wallet_service.pending_amount(user.user_id).await?;
    ok(PendingData { pending_amount })
}

/// Fund the caller's wallet
///
/// POST /api/v1/wallet/fund
#[utoipa::path(
    post,
    path = "/api/v1/wallet/fund",
    request_body = FundRequest,
    responses(
        (status = 200, description = "Deposit transaction record"),
        (status = 400, description = "Invalid amount or payment method"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Wallet is frozen")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn fund_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<FundRequest>,
) -> ApiResult<Transaction> {
    let txn = state
        .wallet_service
        .fund(user.user_id, req.amount.inner(), &req.payment_method)
        .await?;
    ok(txn)
}

/// Request a withdrawal (funds move to pending until settlement)
///
/// POST /api/v1/wallet/withdraw
#[utoipa::path(
    post,
    path = "/api/v1/wallet/withdraw",
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Pending withdrawal transaction record"),
        (status = 400, description = "Invalid amount or insufficient funds"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Wallet is frozen"),
        (status = 404, description = "Wallet not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn withdraw_from_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<Transaction> {
    let txn = state
        .wallet_service
        .withdraw(user.user_id, req.amount.inner(), &req.bank_account_id)
        .await?;
    ok(txn)
}

/// Transfer funds to another user by email
///
/// POST /api/v1/wallet/transfer
#[utoipa::path(
    post,
    path = "/api/v1/wallet/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Completed transfer transaction record"),
        (status = 400, description = "Invalid amount, email or insufficient funds"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Sender or recipient wallet is frozen"),
        (status = 404, description = "Recipient not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn transfer_funds(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<Transaction> {
    req.validate()
        .map_err(|_| ApiError::bad_request("Valid recipient email is required"))?;

    let txn = state
        .wallet_service
        .transfer(
            user.user_id,
            &req.recipient_email,
            req.amount.inner(),
            req.note.as_deref(),
        )
        .await?;
    ok(txn)
}

/// Freeze the caller's wallet
///
/// POST /api/v1/wallet/freeze
#[utoipa::path(
    post,
    path = "/api/v1/wallet/freeze",
    responses(
        (status = 200, description = "Updated wallet record"),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "Wallet not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn freeze_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Wallet> {
    let wallet = state.wallet_service.freeze(user.user_id).await?;
    ok(wallet)
}

/// Unfreeze the caller's wallet
///
/// POST /api/v1/wallet/unfreeze
#[utoipa::path(
    post,
    path = "/api/v1/wallet/unfreeze",
    responses(
        (status = 200, description = "Updated wallet record"),
        (status = 401, description = "Authentication failed"),
        (status = 404, description = "Wallet not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Wallet"
)]
pub async fn unfreeze_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Wallet> {
    let wallet = state.wallet_service.unfreeze(user.user_id).await?;
    ok(wallet)
}

// --- Transaction handlers ---

/// List the caller's transactions (paginated, newest first)
///
/// GET /api/v1/transactions?page&limit&status
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, clamped to >= 1"),
        ("limit" = Option<i64>, Query, description = "Page size, clamped to 1..=100 (default 10)"),
        ("status" = Option<String>, Query, description = "Optional status filter")
    ),
    responses(
        (status = 200, description = "Page of transactions with totals"),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_jwt" = [])),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListTransactionsParams>,
) -> ApiResult<super::query::TransactionPage> {
    let status = match params.status.as_deref() {
        Some(s) => Some(
            TransactionStatus::from_str(s)
                .map_err(|_| ApiError::bad_request(format!("Invalid status filter: {}", s)))?,
        ),
        None => None,
    };

    let page = state
        .query_service
        .list_user_transactions(user.user_id, params.page, params.limit, status)
        .await?;
    ok(page)
}

/// Get a single transaction by id
///
/// GET /api/v1/transactions/{transaction_id}
///
/// Only the owning user or the transfer recipient may read a record.
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Transaction record"),
        (status = 400, description = "Invalid transaction ID format"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Caller is neither owner nor recipient"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(transaction_id): Path<String>,
) -> ApiResult<Transaction> {
    let transaction_id = Uuid::parse_str(&transaction_id)
        .map_err(|_| ApiError::bad_request("Invalid transaction ID format"))?;

    let txn = state
        .query_service
        .get_by_id(transaction_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(error_codes::TRANSACTION_NOT_FOUND, "transaction not found")
        })?;

    // Authorization is a boundary concern: owner or transfer recipient only
    if txn.user_id != user.user_id && txn.recipient_id != Some(user.user_id) {
        return ApiError::forbidden("Unauthorized to access this transaction").into_err();
    }

    ok(txn)
}

// --- Internal handlers ---

/// Settlement callback from the payment-rail integration
///
/// POST /internal/settlement
///
/// Authenticated with the X-Internal-Secret header, not a user token: the
/// caller is the external settlement rail, not a wallet owner.
#[utoipa::path(
    post,
    path = "/internal/settlement",
    request_body = SettlementRequest,
    responses(
        (status = 200, description = "Updated transaction record"),
        (status = 400, description = "Invalid transaction id or status"),
        (status = 403, description = "Missing or invalid X-Internal-Secret"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Transition not allowed from current status")
    ),
    tag = "Internal"
)]
pub async fn settle_transaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SettlementRequest>,
) -> ApiResult<Transaction> {
    let secret = headers
        .get("X-Internal-Secret")
        .and_then(|v| v.to_str().ok());
    if secret != Some(state.internal_secret.as_str()) {
        return ApiError::new(
            axum::http::StatusCode::FORBIDDEN,
            error_codes::AUTH_FAILED,
            "Access Denied: Missing or Invalid X-Internal-Secret",
        )
        .into_err();
    }

    let transaction_id = Uuid::parse_str(&req.transaction_id)
        .map_err(|_| ApiError::bad_request("Invalid transaction ID format"))?;
    let status = TransactionStatus::from_str(&req.status)
        .map_err(|_| ApiError::bad_request(format!("Invalid status: {}", req.status)))?;

    let txn = state
        .query_service
        .update_status(transaction_id, status)
        .await?;
    ok(txn)
}
