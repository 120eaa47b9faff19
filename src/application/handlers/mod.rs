//! Application handlers.
//!
//! Handlers orchestrate domain operations over the ports:
//!
//! - `OutboundGateway` - signed calls to DNS and payment providers
//! - `InboundGuard` - rate limiting plus signature verification
//! - `HandleNotifyHandler` - locked, idempotent webhook processing

pub mod gateway;
pub mod inbound;
pub mod notify;

pub use gateway::{GatewayResponse, OutboundGateway, DEFAULT_OUTBOUND_TIMEOUT};
pub use inbound::{InboundGuard, InboundGuardConfig};
pub use notify::{HandleNotifyHandler, NotifyConfig, NotifyDisposition, NotifyOutcome};
