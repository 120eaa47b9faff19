//! Response DTOs shared by the HTTP adapters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::GatewayResponse;
use crate::domain::inbound::VerifiedRequest;

/// Standard error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `/api/ping` body: proof the caller passed verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub request_id: String,
    pub app_key: String,
    /// Caller's timestamp, Unix seconds.
    pub timestamp: i64,
}

impl From<&VerifiedRequest> for PingResponse {
    fn from(verified: &VerifiedRequest) -> Self {
        Self {
            request_id: verified.request_id.to_string(),
            app_key: verified.app_key.clone(),
            timestamp: verified.timestamp.as_unix_secs(),
        }
    }
}

/// Outbound gateway call result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponseDto {
    pub request_id: String,
    pub order_no: String,
    pub provider: String,
    pub action: String,
    pub provider_action: String,
    pub status: u16,
    pub data: Value,
    pub elapsed_ms: u64,
}

impl From<GatewayResponse> for GatewayResponseDto {
    fn from(response: GatewayResponse) -> Self {
        Self {
            request_id: response.request_id.to_string(),
            order_no: response.order_no.as_str().to_string(),
            provider: response.provider.to_string(),
            action: response.action.to_string(),
            provider_action: response.provider_action,
            status: response.status,
            data: response.data,
            elapsed_ms: response.elapsed_ms,
        }
    }
}
