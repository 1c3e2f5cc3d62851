//! Caller authentication: JWT validation only.
//!
//! Token issuance (registration, login) lives in the external identity
//! service; this module validates the HS256 tokens it mints and resolves
//! them to a stable user id the ledger can trust.

pub mod middleware;
pub mod service;

pub use middleware::AuthUser;
pub use service::{Claims, UserAuthService};
