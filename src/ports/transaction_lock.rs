//! TransactionLock port - Distributed mutex keyed by merchant order number.
//!
//! Serializes concurrent notifications for the same order. Locks are
//! TTL-bounded so a crashed holder cannot block an order forever.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// Proof of lock ownership, consumed by `release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    key: String,
    token: String,
    acquired_at: Timestamp,
}

impl LockHandle {
    pub fn new(key: impl Into<String>, token: impl Into<String>, acquired_at: Timestamp) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
            acquired_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unique per acquisition; release only succeeds for the current token.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn acquired_at(&self) -> Timestamp {
        self.acquired_at
    }
}

/// Port for the per-order lock.
#[async_trait]
pub trait TransactionLock: Send + Sync {
    /// Tries once to take the lock for `key`.
    ///
    /// Returns `None` if another holder owns an unexpired lock.
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockHandle>, LockError>;

    /// Releases the lock if `handle` still owns it. Releasing an expired or
    /// re-acquired lock is a no-op.
    async fn release(&self, handle: LockHandle) -> Result<(), LockError>;
}

/// Lock store failures.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Lock store unavailable: {0}")]
    Unavailable(String),
}
