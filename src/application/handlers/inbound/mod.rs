//! Inbound admission: rate limiting in front of signature verification.

mod inbound_guard;

pub use inbound_guard::{InboundGuard, InboundGuardConfig};
