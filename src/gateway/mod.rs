//! HTTP gateway: router wiring and server startup.
//!
//! The boundary is thin on purpose: authentication middleware resolves the
//! caller to a user id, handlers validate input shape, and everything else
//! lives in the wallet services.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth::middleware::jwt_auth_middleware;
use crate::wallet::handlers as wallet_handlers;
use state::AppState;

/// Build the router and serve until process exit.
pub async fn start_gateway(state: Arc<AppState>, host: &str, port: u16) {
    // ==========================================================================
    // Wallet Routes - Protected by JWT
    // ==========================================================================
    let wallet_routes = Router::new()
        .route("/balance", get(wallet_handlers::get_balance))
        .route("/pending", get(wallet_handlers::get_pending))
        .route("/fund", post(wallet_handlers::fund_wallet))
        .route("/withdraw", post(wallet_handlers::withdraw_from_wallet))
        .route("/transfer", post(wallet_handlers::transfer_funds))
        .route("/freeze", post(wallet_handlers::freeze_wallet))
        .route("/unfreeze", post(wallet_handlers::unfreeze_wallet))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    // ==========================================================================
    // Transaction Routes - Protected by JWT
    // ==========================================================================
    let transaction_routes = Router::new()
        .route(
            "/api/v1/transactions",
            get(wallet_handlers::list_transactions),
        )
        .route(
            "/api/v1/transactions/{transaction_id}",
            get(wallet_handlers::get_transaction),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    // ==========================================================================
    // Internal Routes - settlement rail, X-Internal-Secret checked in handler
    // ==========================================================================
    let internal_routes =
        Router::new().route("/settlement", post(wallet_handlers::settle_transaction));

    let app = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/wallet", wallet_routes)
        .merge(transaction_routes)
        .nest("/internal", internal_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()));

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Wallet ledger gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
