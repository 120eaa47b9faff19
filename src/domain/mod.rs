//! Domain layer containing the signing, verification and notification logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, IDs, errors)
//! - `signing` - Canonical requests and the two signature strategies
//! - `gateway` - Outbound provider profiles, action routing, envelopes
//! - `inbound` - Inbound signed-call verification with replay protection
//! - `notify` - Payment/refund notification parsing and acknowledgement

pub mod foundation;
pub mod gateway;
pub mod inbound;
pub mod notify;
pub mod signing;
