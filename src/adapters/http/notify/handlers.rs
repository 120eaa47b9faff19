//! Notification handler: hands the raw callback to [`HandleNotifyHandler`]
//! and answers with the provider-specific ack.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ErrorResponse;
use crate::application::HandleNotifyHandler;
use crate::domain::notify::{NotifyAck, NotifyProvider};

/// `POST /notify/:provider`
pub async fn receive_notify(
    State(handler): State<Arc<HandleNotifyHandler>>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Response {
    let provider: NotifyProvider = match provider.parse() {
        Ok(p) => p,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found("Notify provider", &provider)),
            )
                .into_response();
        }
    };

    let outcome = handler.handle(provider, &body).await;
    tracing::debug!(
        provider = %provider,
        disposition = ?outcome.disposition,
        "Notification acknowledged"
    );

    ack_response(outcome.ack)
}

fn ack_response(ack: NotifyAck) -> Response {
    (ack.status, [(header::CONTENT_TYPE, ack.content_type)], ack.body).into_response()
}
