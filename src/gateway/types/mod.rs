//! Gateway types module
//!
//! Type-safe types for API boundary enforcement:
//!
//! - [`StrictAmount`]: format-validated money input
//! - [`ApiResponse<T>`]: unified API response wrapper
//! - [`ApiError`] / [`ApiResult`]: handler-level error plumbing

pub mod money;
pub mod response;

pub use money::StrictAmount;
pub use response::{ApiError, ApiResponse, ApiResult, error_codes, ok};
