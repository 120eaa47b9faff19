//! Rate limiter adapters.
//!
//! Implementations of the RateLimiter port for different backends.
//!
//! ## Available Adapters
//!
//! - `InMemoryRateLimiter` - In-memory for testing and single-server
//! - `RedisRateLimiter` - Redis-backed for production multi-server
//!
//! ## Usage
//!
//! ```ignore
//! use signing_gateway::adapters::rate_limiter::InMemoryRateLimiter;
//!
//! // For testing
//! let limiter = InMemoryRateLimiter::with_defaults();
//!
//! // For production
//! let limiter = RedisRateLimiter::new(redis_conn, Duration::from_secs(1));
//! ```

mod in_memory;
mod redis;

pub use in_memory::{InMemoryRateLimiter, DEFAULT_WINDOW};
pub use redis::RedisRateLimiter;
