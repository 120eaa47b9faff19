//! Outbound gateway handler.

mod outbound_gateway;

pub use outbound_gateway::{GatewayResponse, OutboundGateway, DEFAULT_OUTBOUND_TIMEOUT};
