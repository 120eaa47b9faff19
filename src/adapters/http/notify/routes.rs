//! Notification routes.

use std::sync::Arc;

use axum::{routing::post, Router};

use super::handlers::receive_notify;
use crate::application::HandleNotifyHandler;

/// Routes mounted under `/notify`. Not signature-protected; providers sign
/// callbacks with their own schemes, checked upstream.
pub fn notify_routes(handler: Arc<HandleNotifyHandler>) -> Router {
    Router::new()
        .route("/:provider", post(receive_notify))
        .with_state(handler)
}
