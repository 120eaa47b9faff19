//! TransactionRepository port - Persistence collaborator for transactions.
//!
//! Notification handling reads the persisted status to detect redeliveries
//! and moves it forward with a compare-and-set, so a write that races
//! another delivery for the same order is reported rather than applied.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DomainError, Timestamp};

/// Lifecycle of a merchant transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Closed,
    Refunding,
    Refunded,
    RefundFailed,
}

impl TransactionStatus {
    /// True once the payment side has been settled as paid.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Paid
                | TransactionStatus::Refunding
                | TransactionStatus::Refunded
                | TransactionStatus::RefundFailed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Closed => "closed",
            TransactionStatus::Refunding => "refunding",
            TransactionStatus::Refunded => "refunded",
            TransactionStatus::RefundFailed => "refund_failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted view of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub out_trade_no: String,
    pub trade_no: Option<String>,
    pub status: TransactionStatus,
    pub updated_at: Timestamp,
}

impl TransactionRecord {
    /// A freshly created, unpaid order.
    pub fn pending(out_trade_no: impl Into<String>) -> Self {
        Self {
            out_trade_no: out_trade_no.into(),
            trade_no: None,
            status: TransactionStatus::Pending,
            updated_at: Timestamp::now(),
        }
    }
}

/// Port for transaction persistence.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find(&self, out_trade_no: &str) -> Result<Option<TransactionRecord>, DomainError>;

    /// Inserts or replaces a record.
    async fn save(&self, record: TransactionRecord) -> Result<(), DomainError>;

    /// Sets the status (and the provider trade number when known) only if
    /// the stored status still equals `expected`.
    ///
    /// Returns `false`, leaving the record untouched, when another writer
    /// moved the status first.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` if no record exists.
    async fn update_status(
        &self,
        out_trade_no: &str,
        expected: TransactionStatus,
        status: TransactionStatus,
        trade_no: Option<&str>,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_states_count_as_paid() {
        assert!(TransactionStatus::Paid.is_paid());
        assert!(TransactionStatus::Refunded.is_paid());
        assert!(TransactionStatus::RefundFailed.is_paid());
        assert!(!TransactionStatus::Pending.is_paid());
        assert!(!TransactionStatus::Closed.is_paid());
    }

    #[test]
    fn pending_record_has_no_trade_no() {
        let record = TransactionRecord::pending("P1");
        assert_eq!(record.status, TransactionStatus::Pending);
        assert!(record.trade_no.is_none());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&TransactionStatus::RefundFailed).unwrap();
        assert_eq!(json, "\"refund_failed\"");
        assert_eq!(TransactionStatus::RefundFailed.to_string(), "refund_failed");
    }
}
