//! Redis-backed rate limiter implementation for production deployments.
//!
//! Uses a fixed-window counter: INCR and PEXPIRE run together in one Lua
//! script, so a counter can never be left without an expiry.
//! Suitable for multi-server deployments.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

use super::in_memory::DEFAULT_WINDOW;

/// Increments the window counter and returns `{count, pttl}`. The expiry is
/// (re)applied whenever the key has none.
const ATTEMPT_SCRIPT: &str = r#"
local count = redis.call("INCR", KEYS[1])
if redis.call("PTTL", KEYS[1]) < 0 then
    redis.call("PEXPIRE", KEYS[1], ARGV[1])
end
return {count, redis.call("PTTL", KEYS[1])}
"#;

/// Redis-backed rate limiter for production multi-server deployments.
///
/// Uses a fixed-window counter algorithm:
/// 1. INCR the key to increment the counter
/// 2. If the key has no expiry, set PEXPIRE for the window duration
/// 3. If count > limit, deny the request
///
/// Steps 1 and 2 run as one script. Requests can briefly exceed the limit
/// across a window boundary.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    window_ms: u64,
}

impl RedisRateLimiter {
    /// Create a new Redis rate limiter.
    pub fn new(conn: MultiplexedConnection, window: Duration) -> Self {
        Self {
            conn,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1),
        }
    }

    /// Create a Redis rate limiter with a one second window.
    pub fn with_default_window(conn: MultiplexedConnection) -> Self {
        Self::new(conn, DEFAULT_WINDOW)
    }

    fn reset_at(&self, pttl: i64) -> (Timestamp, u64) {
        let reset_ms = if pttl > 0 {
            u64::try_from(pttl).unwrap_or(self.window_ms)
        } else {
            self.window_ms
        };
        let reset_at = Timestamp::now().plus_millis(i64::try_from(reset_ms).unwrap_or(i64::MAX));
        (reset_at, reset_ms)
    }
}

fn unavailable(e: redis::RedisError) -> RateLimitError {
    RateLimitError::Unavailable(e.to_string())
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn attempt(
        &self,
        key: &RateLimitKey,
        limit: u32,
    ) -> Result<RateLimitResult, RateLimitError> {
        let redis_key = key.to_redis_key();
        let mut conn = self.conn.clone();

        let (count, pttl): (i64, i64) = redis::Script::new(ATTEMPT_SCRIPT)
            .key(&redis_key)
            .arg(self.window_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        let (reset_at, reset_ms) = self.reset_at(pttl);

        let count = u32::try_from(count).unwrap_or(u32::MAX);
        if count > limit {
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_ms: reset_ms.max(1),
                scope: key.scope,
                message: format!(
                    "Rate limit exceeded for {}. Retry after {} ms.",
                    key.scope, reset_ms
                ),
            }));
        }

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(count),
            reset_at,
            window_ms: self.window_ms,
        }))
    }

    async fn status(
        &self,
        key: &RateLimitKey,
        limit: u32,
    ) -> Result<RateLimitStatus, RateLimitError> {
        let redis_key = key.to_redis_key();
        let mut conn = self.conn.clone();

        // Get current count (or 0 if not set)
        let count: Option<i64> = conn.get(&redis_key).await.map_err(unavailable)?;
        let count = u32::try_from(count.unwrap_or(0)).unwrap_or(u32::MAX);

        let pttl: i64 = conn.pttl(&redis_key).await.map_err(unavailable)?;
        let (reset_at, _) = self.reset_at(pttl);

        Ok(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(count),
            reset_at,
            window_ms: self.window_ms,
        })
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        let redis_key = key.to_redis_key();
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(&redis_key).await.map_err(unavailable)?;

        Ok(())
    }
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("window_ms", &self.window_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn attempt_script_expires_counter_in_same_call() {
        assert!(ATTEMPT_SCRIPT.contains("INCR"));
        assert!(ATTEMPT_SCRIPT.contains("PEXPIRE"));
        assert!(ATTEMPT_SCRIPT.contains("ARGV[1]"));
    }

    // ════════════════════════════════════════════════════════════════════
    // Live Redis (run with `--ignored`; REDIS_URL or redis://127.0.0.1/)
    // ════════════════════════════════════════════════════════════════════

    async fn connection() -> MultiplexedConnection {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        redis::Client::open(url)
            .unwrap()
            .get_multiplexed_tokio_connection()
            .await
            .unwrap()
    }

    fn unique_key() -> RateLimitKey {
        RateLimitKey::credential(&format!("test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    #[ignore]
    async fn first_attempt_sets_window_expiry() {
        let mut conn = connection().await;
        let limiter = RedisRateLimiter::new(conn.clone(), Duration::from_secs(5));
        let key = unique_key();

        let result = limiter.attempt(&key, 3).await.unwrap();

        assert!(result.is_allowed());
        let pttl: i64 = conn.pttl(key.to_redis_key()).await.unwrap();
        assert!(pttl > 0 && pttl <= 5_000, "pttl was {}", pttl);
        limiter.reset(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn counter_without_expiry_is_repaired() {
        let mut conn = connection().await;
        let limiter = RedisRateLimiter::new(conn.clone(), Duration::from_secs(5));
        let key = unique_key();
        conn.set::<_, _, ()>(key.to_redis_key(), 7_i64).await.unwrap();

        let result = limiter.attempt(&key, 3).await.unwrap();

        assert!(result.is_denied());
        let pttl: i64 = conn.pttl(key.to_redis_key()).await.unwrap();
        assert!(pttl > 0, "pttl was {}", pttl);
        limiter.reset(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn denies_once_limit_is_spent() {
        let limiter = RedisRateLimiter::new(connection().await, Duration::from_secs(5));
        let key = unique_key();

        for _ in 0..2 {
            assert!(limiter.attempt(&key, 2).await.unwrap().is_allowed());
        }
        let denied = limiter.attempt(&key, 2).await.unwrap();

        match denied {
            RateLimitResult::Denied(d) => assert!(d.retry_after_ms > 0 && d.retry_after_ms <= 5_000),
            other => panic!("expected denial, got {:?}", other),
        }
        assert_eq!(limiter.status(&key, 2).await.unwrap().remaining, 0);
        limiter.reset(&key).await.unwrap();
    }
}
