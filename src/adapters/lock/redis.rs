//! Redis-backed transaction lock for multi-instance deployments.
//!
//! Acquire is `SET key token NX PX ttl`. Release runs a compare-and-delete
//! script so a holder whose TTL lapsed cannot delete a newer owner's lock.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::{LockError, LockHandle, TransactionLock};

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Distributed lock over a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisTransactionLock {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisTransactionLock {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: "lock:".to_string(),
        }
    }

    fn redis_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

fn unavailable(e: redis::RedisError) -> LockError {
    LockError::Unavailable(e.to_string())
}

#[async_trait]
impl TransactionLock for RedisTransactionLock {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockHandle>, LockError> {
        let mut conn = self.conn.clone();
        let token = Uuid::new_v4().to_string();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        // Reply is "OK" when set, nil when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.redis_key(key))
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        Ok(reply.map(|_| LockHandle::new(key, token, Timestamp::now())))
    }

    async fn release(&self, handle: LockHandle) -> Result<(), LockError> {
        let mut conn = self.conn.clone();

        let deleted: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(self.redis_key(handle.key()))
            .arg(handle.token())
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        if deleted == 0 {
            tracing::debug!(key = handle.key(), "Lock already expired or taken over");
        }

        Ok(())
    }
}

impl std::fmt::Debug for RedisTransactionLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTransactionLock")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_script_compares_token_before_delete() {
        assert!(RELEASE_SCRIPT.contains("GET"));
        assert!(RELEASE_SCRIPT.contains("ARGV[1]"));
        assert!(RELEASE_SCRIPT.contains("DEL"));
    }

    // Behavioral tests need a running Redis and live alongside the
    // in-memory lock tests, which cover the same contract.
}
