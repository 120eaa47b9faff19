//! Outbound request signing.
//!
//! # Module Organization
//!
//! - `request` - [`SignedRequest`], the per-call input
//! - `canonical` - [`CanonicalRequestBuilder`] and [`SigningProfile`]
//! - `signer` - [`DirectHmacSigner`] and [`DerivedKeySigner`]
//! - `credential` - [`Credential`] key pairs
//! - `encoding` - hashing, HMAC and RFC 3986 encoding helpers
//!
//! Everything here is pure and reentrant.

mod canonical;
mod credential;
pub mod encoding;
mod errors;
mod request;
mod signer;

pub use canonical::{canonical_query_string, CanonicalRequest, CanonicalRequestBuilder, SigningProfile};
pub use credential::Credential;
pub use errors::SigningError;
pub use request::SignedRequest;
pub use signer::{DerivedKeySigner, DirectHmacSigner, Signature, Signer, SigningContext};
