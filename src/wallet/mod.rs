//! Wallet ledger core: balances, immutable transaction records, settlement.
//!
//! Every balance mutation is paired 1:1 with a transaction row inside a
//! single database transaction; the transaction history is the durable
//! proof of every balance delta.

pub mod error;
pub mod handlers;
pub mod query;
pub mod service;
pub mod types;

pub use error::WalletError;
pub use query::{TransactionPage, TransactionQueryService};
pub use service::WalletService;
pub use types::{Transaction, TransactionStatus, TransactionType, Wallet};
