//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::wallet::handlers::{
    BalanceData, FundRequest, PendingData, SettlementRequest, TransferRequest, WithdrawRequest,
};
use crate::wallet::query::TransactionPage;
use crate::wallet::types::{Transaction, TransactionStatus, TransactionType, Wallet};

/// Bearer JWT security scheme. Tokens are minted by the external identity
/// service and validated here with the shared HS256 secret.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Ledger API",
        version = "0.1.0",
        description = "Per-user wallet ledger: balances, immutable transaction history, atomic settlement.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::wallet::handlers::get_balance,
        crate::wallet::handlers::get_pending,
        crate::wallet::handlers::fund_wallet,
        crate::wallet::handlers::withdraw_from_wallet,
        crate::wallet::handlers::transfer_funds,
        crate::wallet::handlers::freeze_wallet,
        crate::wallet::handlers::unfreeze_wallet,
        crate::wallet::handlers::list_transactions,
        crate::wallet::handlers::get_transaction,
        crate::wallet::handlers::settle_transaction,
    ),
    components(
        schemas(
            HealthResponse,
            FundRequest,
            WithdrawRequest,
            TransferRequest,
            SettlementRequest,
            BalanceData,
            PendingData,
            Wallet,
            Transaction,
            TransactionType,
            TransactionStatus,
            TransactionPage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Wallet", description = "Balance queries and balance-mutating operations (auth required)"),
        (name = "Transactions", description = "Transaction history queries (auth required)"),
        (name = "Internal", description = "Settlement callbacks from the payment rail (internal secret)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Wallet Ledger API");
        assert_eq!(spec.info.version, "0.1.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("Wallet Ledger API"));
    }

    #[test]
    fn test_wallet_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/wallet/balance"));
        assert!(paths.paths.contains_key("/api/v1/wallet/fund"));
        assert!(paths.paths.contains_key("/api/v1/wallet/transfer"));
        assert!(paths.paths.contains_key("/api/v1/transactions"));
        assert!(paths.paths.contains_key("/internal/settlement"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}
