//! User account read-side: identity lookup for the ledger.
//!
//! Account issuance (registration, login, sessions) lives in an external
//! identity service. The ledger only needs to resolve user identifiers and
//! transfer recipients by email, plus a provisioning hook used by tooling
//! and tests.

pub mod models;
pub mod repository;

pub use models::{User, UserStatus};
pub use repository::UserRepository;
