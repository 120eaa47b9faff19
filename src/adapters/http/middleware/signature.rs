//! Signature middleware for machine-to-machine API routes.
//!
//! Reads the `app-key` and `signature` headers, gathers the query string and
//! JSON object body into one parameter map, and runs it through the
//! [`InboundGuard`]. On success the [`VerifiedRequest`] is inserted into the
//! request extensions and the buffered body is handed on unchanged.
//!
//! [`VerifiedRequest`]: crate::domain::inbound::VerifiedRequest

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Query, Request, State},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::adapters::http::error::InboundRejection;
use crate::application::InboundGuard;
use crate::domain::foundation::Timestamp;
use crate::domain::inbound::InboundAuthError;

pub const APP_KEY_HEADER: &str = "app-key";
pub const SIGNATURE_HEADER: &str = "signature";

/// Largest body the middleware will buffer.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Verifies the caller before any API handler runs.
///
/// # Usage
///
/// ```ignore
/// let api = Router::new()
///     .route("/ping", get(ping))
///     .route_layer(middleware::from_fn_with_state(guard, signature_middleware));
/// ```
pub async fn signature_middleware(
    State(guard): State<Arc<InboundGuard>>,
    request: Request,
    next: Next,
) -> Response {
    match verify(&guard, request).await {
        Ok(request) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}

async fn verify(guard: &InboundGuard, request: Request) -> Result<Request, InboundRejection> {
    let (mut parts, body) = request.into_parts();

    let app_key = header_value(&parts.headers, APP_KEY_HEADER)?;
    let signature = header_value(&parts.headers, SIGNATURE_HEADER)?;

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| InboundAuthError::MalformedParams(e.to_string()))?;
    let params = collect_params(&parts.uri, &bytes)?;

    let verified = guard
        .check(&app_key, &signature, &params, Timestamp::now())
        .await?;

    parts.extensions.insert(verified);
    Ok(Request::from_parts(parts, Body::from(bytes)))
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<String, InboundRejection> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(InboundRejection(InboundAuthError::MissingHeader(name)))
}

/// Merges query parameters and a JSON object body. Body keys win.
fn collect_params(uri: &Uri, body: &Bytes) -> Result<Map<String, Value>, InboundAuthError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|e| InboundAuthError::MalformedParams(e.body_text()))?;

    let mut params: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(params);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => {
            params.extend(fields);
            Ok(params)
        }
        Ok(_) => Err(InboundAuthError::MalformedParams(
            "body must be a JSON object".to_string(),
        )),
        Err(e) => Err(InboundAuthError::MalformedParams(e.to_string())),
    }
}
