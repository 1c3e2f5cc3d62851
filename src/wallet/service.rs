//! Wallet service: the only writer of wallet balances.
//!
//! Every operation runs as one database transaction. Wallet rows are locked
//! with SELECT ... FOR UPDATE, so two operations on the same wallet can
//! never interleave their read and write; transfers lock both wallets in
//! ascending user_id order to avoid cross-deadlocks.

use super::error::WalletError;
use super::types::{Transaction, TransactionStatus, TransactionType, Wallet};
use crate::account::UserRepository;
use crate::db::Database;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::Postgres;
use std::sync::Arc;
use uuid::Uuid;

type PgTx<'c> = sqlx::Transaction<'c, Postgres>;

/// Amounts are money with at most 2 decimal places.
const AMOUNT_SCALE: u32 = 2;

#[derive(Clone)]
pub struct WalletService {
    db: Arc<Database>,
}

impl WalletService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fund the caller's wallet. Creates the wallet lazily on first use.
    ///
    /// The external payment capture is assumed confirmed by the caller, so
    /// the deposit record is created already approved.
    pub async fn fund(
        &self,
        user_id: i64,
        amount: Decimal,
        payment_method: &str,
    ) -> Result<Transaction, WalletError> {
        validate_amount(amount)?;
        if payment_method.trim().is_empty() {
            return Err(WalletError::Validation(
                "payment method is required".to_string(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;

        let wallet = get_or_create_locked(&mut tx, user_id).await?;
        if wallet.is_frozen {
            return Err(WalletError::FrozenWallet("wallet"));
        }

        update_balances(
            &mut tx,
            user_id,
            wallet.balance + amount,
            wallet.pending_amount,
        )
        .await?;

        let txn = insert_transaction(
            &mut tx,
            user_id,
            None,
            amount,
            TransactionType::Deposit,
            TransactionStatus::Approved,
            &format!("Wallet funded via {}", payment_method),
            Some(json!({ "payment_method": payment_method })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id, %amount, "wallet funded");
        Ok(txn)
    }

    /// Request a withdrawal: reserve funds by moving them from balance to
    /// pending. Settlement completes later via
    /// [`TransactionQueryService::update_status`](super::query::TransactionQueryService::update_status).
    pub async fn withdraw(
        &self,
        user_id: i64,
        amount: Decimal,
        bank_account_id: &str,
    ) -> Result<Transaction, WalletError> {
        validate_amount(amount)?;
        if bank_account_id.trim().is_empty() {
            return Err(WalletError::Validation(
                "bank account id is required".to_string(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;

        let wallet = lock_wallet(&mut tx, user_id)
            .await?
            .ok_or(WalletError::WalletNotFound)?;
        if wallet.is_frozen {
            return Err(WalletError::FrozenWallet("wallet"));
        }
        if wallet.balance < amount {
            return Err(WalletError::InsufficientFunds);
        }

        update_balances(
            &mut tx,
            user_id,
            wallet.balance - amount,
            wallet.pending_amount + amount,
        )
        .await?;

        let txn = insert_transaction(
            &mut tx,
            user_id,
            None,
            amount,
            TransactionType::Withdrawal,
            TransactionStatus::Pending,
            "Withdrawal to bank account",
            Some(json!({ "bank_account_id": bank_account_id })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id, %amount, "withdrawal requested, funds reserved");
        Ok(txn)
    }

    /// Transfer funds to another user, resolved by email. The recipient
    /// wallet is created lazily inside the same transaction. Sender debit,
    /// recipient credit and the audit record commit together or not at all.
    pub async fn transfer(
        &self,
        sender_id: i64,
        recipient_email: &str,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Transaction, WalletError> {
        validate_amount(amount)?;

        let recipient = UserRepository::get_by_email(self.db.pool(), recipient_email)
            .await?
            .ok_or_else(|| WalletError::RecipientNotFound(recipient_email.to_string()))?;

        if recipient.user_id == sender_id {
            return Err(WalletError::Validation(
                "cannot transfer to own wallet".to_string(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;

        // Recipient wallet may not exist yet; create it before taking locks
        // so both rows can be locked in deterministic order below.
        ensure_wallet_row(&mut tx, recipient.user_id).await?;

        // Lock both wallets in ascending user_id order. Two transfers moving
        // funds in opposite directions between the same pair then always
        // queue on the same row first instead of deadlocking.
        let (low, high) = if sender_id < recipient.user_id {
            (sender_id, recipient.user_id)
        } else {
            (recipient.user_id, sender_id)
        };
        let w_low = lock_wallet(&mut tx, low).await?;
        let w_high = lock_wallet(&mut tx, high).await?;
        let (sender_wallet, recipient_wallet) = if low == sender_id {
            (w_low, w_high)
        } else {
            (w_high, w_low)
        };

        let sender_wallet = sender_wallet.ok_or(WalletError::WalletNotFound)?;
        let recipient_wallet = recipient_wallet.ok_or(WalletError::WalletNotFound)?;

        if sender_wallet.is_frozen {
            return Err(WalletError::FrozenWallet("sender wallet"));
        }
        if recipient_wallet.is_frozen {
            return Err(WalletError::FrozenWallet("recipient wallet"));
        }
        if sender_wallet.balance < amount {
            return Err(WalletError::InsufficientFunds);
        }

        update_balances(
            &mut tx,
            sender_id,
            sender_wallet.balance - amount,
            sender_wallet.pending_amount,
        )
        .await?;
        update_balances(
            &mut tx,
            recipient.user_id,
            recipient_wallet.balance + amount,
            recipient_wallet.pending_amount,
        )
        .await?;

        let description = match note {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => "Transfer to another user".to_string(),
        };
        let txn = insert_transaction(
            &mut tx,
            sender_id,
            Some(recipient.user_id),
            amount,
            TransactionType::Transfer,
            TransactionStatus::Completed,
            &description,
            Some(json!({ "recipient_email": recipient_email })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            sender_id,
            recipient_id = recipient.user_id,
            %amount,
            "transfer completed"
        );
        Ok(txn)
    }

    /// Freeze a wallet: blocks all new balance-mutating operations.
    /// Idempotent; records a zero-amount audit row in the same transaction.
    pub async fn freeze(&self, user_id: i64) -> Result<Wallet, WalletError> {
        self.set_frozen(user_id, true).await
    }

    /// Unfreeze a wallet. Idempotent; records a zero-amount audit row.
    pub async fn unfreeze(&self, user_id: i64) -> Result<Wallet, WalletError> {
        self.set_frozen(user_id, false).await
    }

    async fn set_frozen(&self, user_id: i64, frozen: bool) -> Result<Wallet, WalletError> {
        let mut tx = self.db.pool().begin().await?;

        lock_wallet(&mut tx, user_id)
            .await?
            .ok_or(WalletError::WalletNotFound)?;

        let wallet = sqlx::query_as::<_, Wallet>(
            r#"UPDATE wallets_tb
               SET is_frozen = $2, version = version + 1, updated_at = NOW()
               WHERE user_id = $1
               RETURNING user_id, balance, pending_amount, is_frozen, version,
                         created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(frozen)
        .fetch_one(&mut *tx)
        .await?;

        let (tx_type, description) = if frozen {
            (TransactionType::Freezing, "Wallet frozen")
        } else {
            (TransactionType::Unfreezing, "Wallet unfrozen")
        };
        insert_transaction(
            &mut tx,
            user_id,
            None,
            Decimal::ZERO,
            tx_type,
            TransactionStatus::Completed,
            description,
            None,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id, frozen, "wallet freeze state changed");
        Ok(wallet)
    }

    /// Available balance; an absent wallet reads as zero.
    pub async fn balance(&self, user_id: i64) -> Result<Decimal, WalletError> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM wallets_tb WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    /// Pending (reserved) amount; an absent wallet reads as zero.
    pub async fn pending_amount(&self, user_id: i64) -> Result<Decimal, WalletError> {
        let pending: Option<Decimal> =
            sqlx::query_scalar("SELECT pending_amount FROM wallets_tb WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(pending.unwrap_or(Decimal::ZERO))
    }

    /// Fetch a wallet without locking (read-side).
    pub async fn get_wallet(&self, user_id: i64) -> Result<Option<Wallet>, WalletError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"SELECT user_id, balance, pending_amount, is_frozen, version,
                      created_at, updated_at
               FROM wallets_tb WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(wallet)
    }
}

/// Amount must be strictly positive with at most 2 decimal places.
pub(crate) fn validate_amount(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(WalletError::Validation(
            "too many decimal places in amount".to_string(),
        ));
    }
    Ok(())
}

/// Lock a wallet row for the duration of the transaction.
pub(crate) async fn lock_wallet(
    tx: &mut PgTx<'_>,
    user_id: i64,
) -> Result<Option<Wallet>, WalletError> {
    let wallet = sqlx::query_as::<_, Wallet>(
        r#"SELECT user_id, balance, pending_amount, is_frozen, version,
                  created_at, updated_at
           FROM wallets_tb WHERE user_id = $1
           FOR UPDATE"#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(wallet)
}

/// Get-or-create a wallet inside the current transaction, returning the row
/// locked. Two concurrent first-operations both reach the ON CONFLICT path;
/// the loser waits on the winner's insert, then locks the surviving row.
async fn get_or_create_locked(tx: &mut PgTx<'_>, user_id: i64) -> Result<Wallet, WalletError> {
    ensure_wallet_row(tx, user_id).await?;
    lock_wallet(tx, user_id)
        .await?
        .ok_or(WalletError::WalletNotFound)
}

async fn ensure_wallet_row(tx: &mut PgTx<'_>, user_id: i64) -> Result<(), WalletError> {
    sqlx::query(
        "INSERT INTO wallets_tb (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub(crate) async fn update_balances(
    tx: &mut PgTx<'_>,
    user_id: i64,
    balance: Decimal,
    pending_amount: Decimal,
) -> Result<(), WalletError> {
    sqlx::query(
        r#"UPDATE wallets_tb
           SET balance = $2, pending_amount = $3, version = version + 1, updated_at = NOW()
           WHERE user_id = $1"#,
    )
    .bind(user_id)
    .bind(balance)
    .bind(pending_amount)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_transaction(
    tx: &mut PgTx<'_>,
    user_id: i64,
    recipient_id: Option<i64>,
    amount: Decimal,
    tx_type: TransactionType,
    status: TransactionStatus,
    description: &str,
    metadata: Option<serde_json::Value>,
) -> Result<Transaction, WalletError> {
    let txn = sqlx::query_as::<_, Transaction>(
        r#"INSERT INTO transactions_tb
               (transaction_id, user_id, recipient_id, amount, tx_type, status,
                description, metadata)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
           RETURNING transaction_id, user_id, recipient_id, amount, tx_type, status,
                     description, metadata, created_at, updated_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(recipient_id)
    .bind(amount)
    .bind(tx_type.as_str())
    .bind(status.as_str())
    .bind(description)
    .bind(metadata)
    .fetch_one(&mut **tx)
    .await?;
    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_amount_positive() {
        assert!(validate_amount(Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("1000").unwrap()).is_ok());
        assert!(validate_amount(Decimal::from_str("99.99").unwrap()).is_ok());
    }

    #[test]
    fn test_validate_amount_rejects_zero_and_negative() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from_str("-5").unwrap()).is_err());
    }

    #[test]
    fn test_validate_amount_rejects_excess_scale() {
        assert!(validate_amount(Decimal::from_str("1.001").unwrap()).is_err());
        // Trailing zeros beyond 2 places normalize away and are accepted
        assert!(validate_amount(Decimal::from_str("1.100").unwrap()).is_ok());
    }
}
