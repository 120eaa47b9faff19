//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `credentials` - Provider and inbound app secrets
//! - `events` - Gateway event sinks and notify listeners
//! - `http` - axum HTTP surface
//! - `http_client` - Outbound transport (reqwest)
//! - `lock` - Per-order transaction locks (in-memory, Redis)
//! - `rate_limiter` - Fixed-window limiters (in-memory, Redis)
//! - `transactions` - Transaction status store

pub mod credentials;
pub mod events;
pub mod http;
pub mod http_client;
pub mod lock;
pub mod rate_limiter;
pub mod transactions;

pub use credentials::InMemoryCredentialStore;
pub use events::{
    InMemoryGatewayEvents, RecordingNotifyListener, TracingEventPublisher, TracingNotifyListener,
};
pub use http_client::{RecordingHttpClient, ReqwestHttpClient, ReqwestHttpClientConfig};
pub use lock::{InMemoryTransactionLock, RedisTransactionLock};
pub use rate_limiter::{InMemoryRateLimiter, RedisRateLimiter};
pub use transactions::InMemoryTransactionRepository;
