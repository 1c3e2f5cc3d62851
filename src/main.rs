use anyhow::Context;
use std::sync::Arc;

use wallet_ledger::config::AppConfig;
use wallet_ledger::db::Database;
use wallet_ledger::gateway::{self, state::AppState};
use wallet_ledger::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment name selects config/{env}.yaml; CLI arg wins over APP_ENV
    let env = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("APP_ENV").ok())
        .unwrap_or_else(|| "dev".to_string());

    let config = AppConfig::load(&env);
    let _log_guard = logging::init_logging(&config);

    tracing::info!(env = %env, "starting wallet ledger");

    let database_url = config
        .database_url()
        .context("postgres_url not configured (config or DATABASE_URL)")?;

    let db = Arc::new(Database::connect(&database_url).await?);
    db.apply_schema().await?;

    let state = Arc::new(AppState::new(db, &config));

    gateway::start_gateway(state, &config.gateway.host, config.gateway.port).await;

    Ok(())
}
