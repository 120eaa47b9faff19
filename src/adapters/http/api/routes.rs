//! API routes.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{call_gateway, ping};
use crate::adapters::http::middleware::signature_middleware;
use crate::application::{InboundGuard, OutboundGateway};

/// Routes mounted under `/api`, all behind signature verification.
pub fn api_routes(gateway: Arc<OutboundGateway>, guard: Arc<InboundGuard>) -> Router {
    Router::new()
        .route("/ping", get(ping).post(ping))
        .route("/gateway/:provider/:action", post(call_gateway))
        .route_layer(middleware::from_fn_with_state(guard, signature_middleware))
        .with_state(gateway)
}
