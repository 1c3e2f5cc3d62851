//! Wallet Ledger - per-user balance bookkeeping with an immutable audit trail.
//!
//! Every balance delta commits together with its transaction record, so the
//! history is always the durable proof of the balance.
//!
//! # Modules
//!
//! - [`wallet`] - Wallet service, transaction query service, types, handlers
//! - [`account`] - User identity read-side (recipient resolution)
//! - [`db`] - PostgreSQL ledger store connection and schema bootstrap
//! - [`gateway`] - HTTP boundary: router, state, response envelope, OpenAPI
//! - [`user_auth`] - JWT validation middleware (token issuance is external)
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing setup (rolling file + stdout)

pub mod account;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod user_auth;
pub mod wallet;

// Convenient re-exports at crate root
pub use account::{User, UserRepository};
pub use config::AppConfig;
pub use db::Database;
pub use wallet::{
    Transaction, TransactionPage, TransactionQueryService, TransactionStatus, TransactionType,
    Wallet, WalletError, WalletService,
};
