//! Read-side access to transaction history, plus the settlement status
//! transition that completes or fails an in-flight withdrawal.

use super::error::WalletError;
use super::types::{Transaction, TransactionStatus, TransactionType};
use super::service::{lock_wallet, update_balances};
use crate::db::Database;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

/// One page of a user's transaction history, most recent first.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub pages: i64,
}

#[derive(Clone)]
pub struct TransactionQueryService {
    db: Arc<Database>,
}

impl TransactionQueryService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List a user's transactions ordered by creation time descending.
    ///
    /// Out-of-range pagination values are clamped: page < 1 becomes 1,
    /// limit is forced into 1..=100 (missing limit defaults to 10).
    pub async fn list_user_transactions(
        &self,
        user_id: i64,
        page: Option<i64>,
        limit: Option<i64>,
        status: Option<TransactionStatus>,
    ) -> Result<TransactionPage, WalletError> {
        let (page, limit) = clamp_pagination(page, limit);
        let offset = (page - 1) * limit;

        let (transactions, total) = match status {
            Some(status) => {
                let rows = sqlx::query_as::<_, Transaction>(
                    r#"SELECT transaction_id, user_id, recipient_id, amount, tx_type, status,
                              description, metadata, created_at, updated_at
                       FROM transactions_tb
                       WHERE user_id = $1 AND status = $2
                       ORDER BY created_at DESC
                       LIMIT $3 OFFSET $4"#,
                )
                .bind(user_id)
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(self.db.pool())
                .await?;

                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM transactions_tb WHERE user_id = $1 AND status = $2",
                )
                .bind(user_id)
                .bind(status.as_str())
                .fetch_one(self.db.pool())
                .await?;

                (rows, total)
            }
            None => {
                let rows = sqlx::query_as::<_, Transaction>(
                    r#"SELECT transaction_id, user_id, recipient_id, amount, tx_type, status,
                              description, metadata, created_at, updated_at
                       FROM transactions_tb
                       WHERE user_id = $1
                       ORDER BY created_at DESC
                       LIMIT $2 OFFSET $3"#,
                )
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(self.db.pool())
                .await?;

                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM transactions_tb WHERE user_id = $1")
                        .bind(user_id)
                        .fetch_one(self.db.pool())
                        .await?;

                (rows, total)
            }
        };

        let pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Ok(TransactionPage {
            transactions,
            total,
            pages,
        })
    }

    /// Fetch a single transaction. Authorization (owner or recipient) is a
    /// boundary concern: the raw record is returned regardless of caller.
    pub async fn get_by_id(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, WalletError> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"SELECT transaction_id, user_id, recipient_id, amount, tx_type, status,
                      description, metadata, created_at, updated_at
               FROM transactions_tb WHERE transaction_id = $1"#,
        )
        .bind(transaction_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(txn)
    }

    /// Settle an in-flight withdrawal: `pending -> completed` releases the
    /// reserved funds, `pending -> failed` refunds them to the balance.
    /// Any other transition is rejected. The transaction row is locked
    /// first, so a duplicated settlement callback observes the terminal
    /// status and fails instead of applying twice.
    pub async fn update_status(
        &self,
        transaction_id: Uuid,
        new_status: TransactionStatus,
    ) -> Result<Transaction, WalletError> {
        let mut tx = self.db.pool().begin().await?;

        let txn = sqlx::query_as::<_, Transaction>(
            r#"SELECT transaction_id, user_id, recipient_id, amount, tx_type, status,
                      description, metadata, created_at, updated_at
               FROM transactions_tb WHERE transaction_id = $1
               FOR UPDATE"#,
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| WalletError::TransactionNotFound(transaction_id.to_string()))?;

        if !txn.status.can_transition_to(new_status) {
            return Err(WalletError::InvalidStatusTransition {
                from: txn.status,
                to: new_status,
            });
        }

        let updated = sqlx::query_as::<_, Transaction>(
            r#"UPDATE transactions_tb
               SET status = $2, updated_at = NOW()
               WHERE transaction_id = $1
               RETURNING transaction_id, user_id, recipient_id, amount, tx_type, status,
                         description, metadata, created_at, updated_at"#,
        )
        .bind(transaction_id)
        .bind(new_status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // Only withdrawals carry reserved funds. The freeze flag is not
        // checked here: the money already left the balance, and settlement
        // of an in-flight withdrawal must still land (see DESIGN.md).
        if txn.tx_type == TransactionType::Withdrawal {
            let wallet = lock_wallet(&mut tx, txn.user_id)
                .await?
                .ok_or(WalletError::WalletNotFound)?;

            match new_status {
                TransactionStatus::Completed => {
                    update_balances(
                        &mut tx,
                        txn.user_id,
                        wallet.balance,
                        wallet.pending_amount - txn.amount,
                    )
                    .await?;
                }
                TransactionStatus::Failed => {
                    update_balances(
                        &mut tx,
                        txn.user_id,
                        wallet.balance + txn.amount,
                        wallet.pending_amount - txn.amount,
                    )
                    .await?;
                }
                // can_transition_to only admits the two arms above
                _ => {
                    return Err(WalletError::InvalidStatusTransition {
                        from: txn.status,
                        to: new_status,
                    });
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction_id,
            from = %txn.status,
            to = %new_status,
            "transaction status updated"
        );
        Ok(updated)
    }
}

/// Clamp pagination inputs into lawful ranges.
pub(crate) fn clamp_pagination(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_pagination_defaults() {
        assert_eq!(clamp_pagination(None, None), (1, 10));
    }

    #[test]
    fn test_clamp_pagination_low_values() {
        assert_eq!(clamp_pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_pagination(Some(-5), Some(-1)), (1, 1));
    }

    #[test]
    fn test_clamp_pagination_high_limit() {
        assert_eq!(clamp_pagination(Some(3), Some(1000)), (3, 100));
        assert_eq!(clamp_pagination(Some(3), Some(100)), (3, 100));
    }

    #[test]
    fn test_clamp_pagination_in_range_untouched() {
        assert_eq!(clamp_pagination(Some(2), Some(25)), (2, 25));
    }
}
