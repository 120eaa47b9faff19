//! Inbound signed-call verification.

mod errors;
mod flatten;
mod verifier;

pub use errors::InboundAuthError;
pub use flatten::{flatten_params, sign_string};
pub use verifier::{
    compute_signature, InboundSignatureVerifier, VerifiedRequest, DEFAULT_REPLAY_WINDOW_SECS,
};
