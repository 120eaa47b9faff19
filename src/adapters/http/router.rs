//! Top-level router.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::api::api_routes;
use super::dto::HealthResponse;
use super::notify::notify_routes;
use crate::application::{HandleNotifyHandler, InboundGuard, OutboundGateway};

/// Shared application services.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<OutboundGateway>,
    pub guard: Arc<InboundGuard>,
    pub notify: Arc<HandleNotifyHandler>,
}

/// Builds the full router: `/health`, `/notify/*` and the signed `/api/*`.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/notify", notify_routes(state.notify))
        .nest("/api", api_routes(state.gateway, state.guard))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
