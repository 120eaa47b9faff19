//! Signing Gateway - Request signing, inbound verification and payment
//! notification handling.
//!
//! Outbound calls to payment and DNS providers are signed with the
//! provider's scheme (ACS3 or TC3), inbound machine-to-machine calls are
//! verified with HMAC-SHA256 inside a replay window, and payment/refund
//! callbacks are processed exactly once under a per-order lock.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
pub mod telemetry;
