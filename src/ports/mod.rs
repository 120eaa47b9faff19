//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `CredentialStore` - Provider and inbound app credentials
//! - `HttpClient` - Outbound HTTP transport
//! - `TransactionRepository` - Persisted transaction status
//! - `NotifyListener` - Business reaction to settled payments/refunds
//!
//! ## Shared State Ports
//!
//! - `TransactionLock` - Per-order distributed mutex
//! - `RateLimiter` - Fixed-window admission control
//!
//! ## Observability Ports
//!
//! - `GatewayEventPublisher` - Outbound "request created" events

mod credential_store;
mod gateway_events;
mod http_client;
mod notify_listener;
mod rate_limiter;
mod transaction_lock;
mod transaction_repository;

pub use credential_store::{AppCredential, CredentialStore, CredentialStoreError};
pub use gateway_events::{GatewayEventPublisher, GatewayRequestCreated};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
pub use notify_listener::NotifyListener;
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitScope,
    RateLimitStatus, RateLimiter,
};
pub use transaction_lock::{LockError, LockHandle, TransactionLock};
pub use transaction_repository::{TransactionRecord, TransactionRepository, TransactionStatus};
