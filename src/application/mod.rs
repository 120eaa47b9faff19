//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    GatewayResponse, HandleNotifyHandler, InboundGuard, InboundGuardConfig, NotifyConfig,
    NotifyDisposition, NotifyOutcome, OutboundGateway, DEFAULT_OUTBOUND_TIMEOUT,
};
