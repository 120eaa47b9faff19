//! In-memory rate limiter implementation for testing and development.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! Not suitable for production multi-server deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// In-memory rate limiter for testing and single-server deployments.
///
/// Each window tracks the count of requests and resets when the window
/// expires. Time is tracked in milliseconds so sub-second windows work.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    /// Per-key window state.
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
    /// Window duration in milliseconds.
    window_ms: u64,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests in the current window.
    count: u32,
    /// When the current window started (unix millis).
    window_start: i64,
}

impl InMemoryRateLimiter {
    /// Create a new in-memory rate limiter with the given window length.
    pub fn new(window: Duration) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1),
        }
    }

    /// Create a rate limiter with a one second window.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_WINDOW)
    }

    /// Current time as unix milliseconds.
    fn now_millis() -> i64 {
        Timestamp::now().as_unix_millis()
    }

    fn window_end(&self, window_start: i64) -> i64 {
        window_start.saturating_add(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }

    fn reset_at(&self, window_start: i64) -> Timestamp {
        Timestamp::from_unix_millis(self.window_end(window_start)).unwrap_or_else(Timestamp::now)
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn attempt(
        &self,
        key: &RateLimitKey,
        limit: u32,
    ) -> Result<RateLimitResult, RateLimitError> {
        let storage_key = key.to_redis_key();
        let now = Self::now_millis();

        let mut windows = self.windows.write().await;

        // Get or create window state
        let state = windows.entry(storage_key).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
        });

        // Check if window has expired
        if now >= self.window_end(state.window_start) {
            state.count = 0;
            state.window_start = now;
        }

        // Increment first, then compare
        state.count = state.count.saturating_add(1);

        if state.count > limit {
            let retry_after_ms =
                u64::try_from(self.window_end(state.window_start).saturating_sub(now)).unwrap_or(0);

            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_ms: retry_after_ms.max(1),
                scope: key.scope,
                message: format!(
                    "Rate limit exceeded for {}. Retry after {} ms.",
                    key.scope, retry_after_ms
                ),
            }));
        }

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(state.count),
            reset_at: self.reset_at(state.window_start),
            window_ms: self.window_ms,
        }))
    }

    async fn status(
        &self,
        key: &RateLimitKey,
        limit: u32,
    ) -> Result<RateLimitStatus, RateLimitError> {
        let storage_key = key.to_redis_key();
        let now = Self::now_millis();

        let windows = self.windows.read().await;

        let (count, window_start) = windows
            .get(&storage_key)
            .map(|state| {
                if now >= self.window_end(state.window_start) {
                    (0, now) // Window expired
                } else {
                    (state.count, state.window_start)
                }
            })
            .unwrap_or((0, now));

        Ok(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(count),
            reset_at: self.reset_at(window_start),
            window_ms: self.window_ms,
        })
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        let mut windows = self.windows.write().await;
        windows.remove(&key.to_redis_key());
        Ok(())
    }
}
