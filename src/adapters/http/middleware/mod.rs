//! HTTP middleware.
//!
//! - `signature` - Verifies inbound signed calls before API handlers run

mod signature;

pub use signature::{signature_middleware, APP_KEY_HEADER, MAX_BODY_BYTES, SIGNATURE_HEADER};
