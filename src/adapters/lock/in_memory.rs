//! In-memory transaction lock.
//!
//! Entries expire after their TTL so a dropped handle cannot wedge an order.
//! Only suitable for a single process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::{LockError, LockHandle, TransactionLock};

#[derive(Debug, Clone)]
struct Held {
    token: String,
    /// Unix millis after which the entry is stale.
    expires_at: i64,
}

/// Lock table guarded by a tokio mutex.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionLock {
    held: Arc<Mutex<HashMap<String, Held>>>,
}

impl InMemoryTransactionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` is currently held by anyone.
    pub async fn is_held(&self, key: &str) -> bool {
        let now = Timestamp::now().as_unix_millis();
        self.held
            .lock()
            .await
            .get(key)
            .map(|h| h.expires_at > now)
            .unwrap_or(false)
    }
}

#[async_trait]
impl TransactionLock for InMemoryTransactionLock {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockHandle>, LockError> {
        let now = Timestamp::now();
        let now_ms = now.as_unix_millis();
        let mut held = self.held.lock().await;

        if let Some(existing) = held.get(key) {
            if existing.expires_at > now_ms {
                return Ok(None);
            }
        }

        let token = Uuid::new_v4().to_string();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        held.insert(
            key.to_string(),
            Held {
                token: token.clone(),
                expires_at: now_ms.saturating_add(ttl_ms),
            },
        );

        Ok(Some(LockHandle::new(key, token, now)))
    }

    async fn release(&self, handle: LockHandle) -> Result<(), LockError> {
        let mut held = self.held.lock().await;
        if held
            .get(handle.key())
            .map(|h| h.token == handle.token())
            .unwrap_or(false)
        {
            held.remove(handle.key());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn second_acquire_fails_while_held() {
        let lock = InMemoryTransactionLock::new();

        let first = lock.acquire("notify:P1", TTL).await.unwrap();
        assert!(first.is_some());
        assert!(lock.acquire("notify:P1", TTL).await.unwrap().is_none());
        assert!(lock.is_held("notify:P1").await);
    }

    #[tokio::test]
    async fn release_allows_reacquire() {
        let lock = InMemoryTransactionLock::new();

        let handle = lock.acquire("notify:P1", TTL).await.unwrap().unwrap();
        lock.release(handle).await.unwrap();

        assert!(!lock.is_held("notify:P1").await);
        assert!(lock.acquire("notify:P1", TTL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn different_keys_do_not_conflict() {
        let lock = InMemoryTransactionLock::new();

        assert!(lock.acquire("notify:P1", TTL).await.unwrap().is_some());
        assert!(lock.acquire("notify:P2", TTL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_lock_can_be_taken_over() {
        let lock = InMemoryTransactionLock::new();

        let _stale = lock
            .acquire("notify:P1", Duration::from_millis(20))
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(lock.acquire("notify:P1", TTL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stale_handle_does_not_release_new_owner() {
        let lock = InMemoryTransactionLock::new();

        let stale = lock
            .acquire("notify:P1", Duration::from_millis(20))
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let _current = lock.acquire("notify:P1", TTL).await.unwrap().unwrap();

        lock.release(stale).await.unwrap();

        assert!(lock.is_held("notify:P1").await);
    }
}
