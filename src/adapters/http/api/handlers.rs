//! API handlers. Every route here sits behind the signature middleware, so
//! a [`VerifiedRequest`] extension is always present.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::adapters::http::dto::{GatewayResponseDto, PingResponse};
use crate::adapters::http::error::GatewayApiError;
use crate::application::OutboundGateway;
use crate::domain::gateway::{ActionInput, GatewayAction, GatewayError, ProviderKind};
use crate::domain::inbound::VerifiedRequest;

/// `GET|POST /api/ping`
pub async fn ping(Extension(verified): Extension<VerifiedRequest>) -> Json<PingResponse> {
    Json(PingResponse::from(&verified))
}

/// `POST /api/gateway/:provider/:action`
///
/// The JSON body carries the action's fields; signing fields such as
/// `timestamp` are ignored by the action parser.
pub async fn call_gateway(
    State(gateway): State<Arc<OutboundGateway>>,
    Extension(verified): Extension<VerifiedRequest>,
    Path((provider, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<GatewayResponseDto>, GatewayApiError> {
    let provider: ProviderKind = provider
        .parse()
        .map_err(|e: GatewayError| GatewayError::InvalidParams(e.to_string()))?;
    let action: GatewayAction = action.parse()?;

    let fields = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidParams(e.to_string()))?
    };
    let input = ActionInput::from_json(action, fields)?;

    tracing::info!(
        request_id = %verified.request_id,
        app_key = %verified.app_key,
        provider = %provider,
        action = %action,
        "Gateway call requested"
    );

    let response = gateway.execute(provider, input).await?;
    Ok(Json(response.into()))
}
