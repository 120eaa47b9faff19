//! HTTP adapter: axum router, signature middleware and endpoint handlers.
//!
//! - `/health` - liveness
//! - `/notify/:provider` - payment provider callbacks
//! - `/api/*` - signed machine-to-machine calls

pub mod api;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod notify;
mod router;

pub use router::{app_router, AppState};
