use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Transaction type, fixed at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    Freezing,
    Unfreezing,
    PndAmount,
    PlaceLien,
    Collateral,
    Liquidation,
    StockInvestment,
    AwaitingApproval,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
            TransactionType::Freezing => "freezing",
            TransactionType::Unfreezing => "unfreezing",
            TransactionType::PndAmount => "pnd_amount",
            TransactionType::PlaceLien => "place_lien",
            TransactionType::Collateral => "collateral",
            TransactionType::Liquidation => "liquidation",
            TransactionType::StockInvestment => "stock_investment",
            TransactionType::AwaitingApproval => "awaiting_approval",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "transfer" => Ok(TransactionType::Transfer),
            "freezing" => Ok(TransactionType::Freezing),
            "unfreezing" => Ok(TransactionType::Unfreezing),
            "pnd_amount" => Ok(TransactionType::PndAmount),
            "place_lien" => Ok(TransactionType::PlaceLien),
            "collateral" => Ok(TransactionType::Collateral),
            "liquidation" => Ok(TransactionType::Liquidation),
            "stock_investment" => Ok(TransactionType::StockInvestment),
            "awaiting_approval" => Ok(TransactionType::AwaitingApproval),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Transaction status. Only withdrawals are created `pending` and
/// transition later; every other type is created in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Approved,
    Liquidated,
    AwaitingApproval,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Liquidated => "liquidated",
            TransactionStatus::AwaitingApproval => "awaiting_approval",
        }
    }

    /// Lawful status transitions: pending -> {completed, failed}.
    /// Everything else is rejected (see `WalletError::InvalidStatusTransition`).
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            "approved" => Ok(TransactionStatus::Approved),
            "liquidated" => Ok(TransactionStatus::Liquidated),
            "awaiting_approval" => Ok(TransactionStatus::AwaitingApproval),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Per-user wallet: available balance, pending (reserved) amount, freeze flag
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Wallet {
    pub user_id: i64,
    /// Available balance, always >= 0
    #[schema(value_type = String, example = "1000.00")]
    pub balance: Decimal,
    /// Funds reserved for in-flight withdrawals, always >= 0
    #[schema(value_type = String, example = "0.00")]
    pub pending_amount: Decimal,
    pub is_frozen: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable audit record of a single balance-affecting event.
/// Type, ownership and amount never change after insert; only `status`
/// (and `updated_at`) may transition.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<i64>,
    #[schema(value_type = String, example = "250.00")]
    pub amount: Decimal,
    #[sqlx(try_from = "String")]
    pub tx_type: TransactionType,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_roundtrip() {
        let all = [
            TransactionType::Deposit,
            TransactionType::Withdrawal,
            TransactionType::Transfer,
            TransactionType::Freezing,
            TransactionType::Unfreezing,
            TransactionType::PndAmount,
            TransactionType::PlaceLien,
            TransactionType::Collateral,
            TransactionType::Liquidation,
            TransactionType::StockInvestment,
            TransactionType::AwaitingApproval,
        ];
        for t in all {
            let parsed: TransactionType = t.as_str().parse().unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn test_transaction_type_invalid() {
        assert!("refund".parse::<TransactionType>().is_err());
        assert!("".parse::<TransactionType>().is_err());
        // Case-sensitive on purpose: stored values are always lowercase
        assert!("Deposit".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_status_roundtrip() {
        let all = [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
            TransactionStatus::Approved,
            TransactionStatus::Liquidated,
            TransactionStatus::AwaitingApproval,
        ];
        for s in all {
            let parsed: TransactionStatus = s.as_str().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let json = serde_json::to_string(&TransactionStatus::AwaitingApproval).unwrap();
        assert_eq!(json, r#""awaiting_approval""#);
        let json = serde_json::to_string(&TransactionType::StockInvestment).unwrap();
        assert_eq!(json, r#""stock_investment""#);
    }

    #[test]
    fn test_only_pending_transitions() {
        use TransactionStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));

        // Terminal states never move
        for from in [Completed, Failed, Approved, Liquidated, AwaitingApproval] {
            for to in [Pending, Completed, Failed, Approved, Liquidated, AwaitingApproval] {
                assert!(
                    !from.can_transition_to(to),
                    "{} -> {} should be rejected",
                    from,
                    to
                );
            }
        }

        // pending -> pending is also not a transition
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Approved));
    }
}
