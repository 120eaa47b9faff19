//! Notification handling errors.

use std::time::Duration;
use thiserror::Error;

/// Errors that occur while handling a payment/refund notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No parser for the provider named in the path.
    #[error("Unsupported notify provider: {0}")]
    UnsupportedProvider(String),

    /// Body is not a recognizable callback.
    #[error("Malformed notification: {0}")]
    Malformed(String),

    /// Required field missing from the callback.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Another delivery for the same order holds the lock.
    #[error("Lock contention on order {0}")]
    LockContention(String),

    /// Lock store could not be reached.
    #[error("Lock unavailable: {0}")]
    LockUnavailable(String),

    /// No persisted transaction for the order.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Persistence collaborator failed.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Business listener failed.
    #[error("Listener error: {0}")]
    Listener(String),

    /// Handler body panicked.
    #[error("Handler panicked: {0}")]
    Panicked(String),

    /// Handler body ran past its deadline and was cancelled.
    #[error("Handler exceeded {0:?}")]
    HandlerTimeout(Duration),

    /// Refund notice for an order that was never paid.
    #[error("Refund notice for unpaid order {order} (status {status})")]
    RefundBeforePayment { order: String, status: String },
}

impl NotifyError {
    /// Returns true if the provider should redeliver the notification.
    ///
    /// Only lock failures are retryable; every other failure is logged and
    /// acknowledged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NotifyError::LockContention(_) | NotifyError::LockUnavailable(_)
        )
    }

    /// Returns true if the callback itself could not be parsed.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            NotifyError::Malformed(_) | NotifyError::MissingField(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lock_failures_are_retryable() {
        assert!(NotifyError::LockContention("P1".into()).is_retryable());
        assert!(NotifyError::LockUnavailable("redis down".into()).is_retryable());
        assert!(!NotifyError::TransactionNotFound("P1".into()).is_retryable());
        assert!(!NotifyError::Listener("boom".into()).is_retryable());
        assert!(!NotifyError::Panicked("boom".into()).is_retryable());
        assert!(!NotifyError::HandlerTimeout(Duration::from_secs(8)).is_retryable());
        assert!(!NotifyError::Malformed("x".into()).is_retryable());
    }

    #[test]
    fn parse_failures_are_malformed() {
        assert!(NotifyError::MissingField("out_trade_no").is_malformed());
        assert!(NotifyError::Malformed("x".into()).is_malformed());
        assert!(!NotifyError::Repository("x".into()).is_malformed());
    }

    #[test]
    fn refund_before_payment_names_order_and_status() {
        let err = NotifyError::RefundBeforePayment {
            order: "P1".to_string(),
            status: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "Refund notice for unpaid order P1 (status pending)");
        assert!(!err.is_retryable());
    }

    #[test]
    fn lock_contention_names_order() {
        let err = NotifyError::LockContention("P20240115".to_string());
        assert_eq!(err.to_string(), "Lock contention on order P20240115");
    }
}
