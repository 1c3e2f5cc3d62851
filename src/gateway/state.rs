use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::user_auth::UserAuthService;
use crate::wallet::{TransactionQueryService, WalletService};

/// Shared gateway application state.
///
/// Services are constructed once at process start and passed explicitly;
/// there is no ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub wallet_service: WalletService,
    pub query_service: TransactionQueryService,
    pub user_auth: Arc<UserAuthService>,
    /// Shared secret for the settlement callback (payment-rail integration)
    pub internal_secret: String,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: &AppConfig) -> Self {
        Self {
            wallet_service: WalletService::new(db.clone()),
            query_service: TransactionQueryService::new(db.clone()),
            user_auth: Arc::new(UserAuthService::new(config.jwt_secret.clone())),
            internal_secret: config.internal_secret.clone(),
            db,
        }
    }
}
