use super::types::TransactionStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("wallet not found")]
    WalletNotFound,

    #[error("{0} is frozen")]
    FrozenWallet(&'static str),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl WalletError {
    /// Domain errors are expected business outcomes; storage errors are not.
    pub fn is_domain(&self) -> bool {
        !matches!(self, WalletError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            WalletError::FrozenWallet("wallet").to_string(),
            "wallet is frozen"
        );
        assert_eq!(
            WalletError::FrozenWallet("recipient wallet").to_string(),
            "recipient wallet is frozen"
        );
        assert_eq!(
            WalletError::InsufficientFunds.to_string(),
            "insufficient funds"
        );
        let e = WalletError::InvalidStatusTransition {
            from: TransactionStatus::Completed,
            to: TransactionStatus::Failed,
        };
        assert_eq!(e.to_string(), "invalid status transition: completed -> failed");
    }

    #[test]
    fn test_storage_is_not_domain() {
        assert!(!WalletError::Storage(sqlx::Error::RowNotFound).is_domain());
        assert!(WalletError::WalletNotFound.is_domain());
        assert!(WalletError::Validation("bad".into()).is_domain());
    }
}
