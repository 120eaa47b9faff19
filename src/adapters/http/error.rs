//! Mapping of application errors onto HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorResponse;
use crate::domain::gateway::GatewayError;
use crate::domain::inbound::InboundAuthError;

/// Rejection produced by the signature middleware.
#[derive(Debug)]
pub struct InboundRejection(pub InboundAuthError);

impl From<InboundAuthError> for InboundRejection {
    fn from(err: InboundAuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for InboundRejection {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = ErrorResponse::new(self.0.error_code(), self.0.to_string());
        let mut response = (status, Json(body)).into_response();

        if let InboundAuthError::RateLimitExceeded { retry_after_ms } = self.0 {
            let secs = retry_after_ms.div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Error wrapper for gateway endpoints.
#[derive(Debug)]
pub struct GatewayApiError(pub GatewayError);

impl From<GatewayError> for GatewayApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for GatewayApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            GatewayError::UnsupportedAction { .. } => (StatusCode::BAD_REQUEST, "UNSUPPORTED_ACTION"),
            GatewayError::InvalidParams(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMS"),
            GatewayError::Configuration(_) | GatewayError::Signing(_) => {
                tracing::error!(error = %self.0, "Gateway misconfigured");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            GatewayError::ProviderEnvelope { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            GatewayError::Http { .. } | GatewayError::InvalidResponse(_) => {
                (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE")
            }
            GatewayError::Transport(_) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
            GatewayError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT"),
        };

        (status, Json(ErrorResponse::new(error_code, self.0.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateway::{GatewayAction, ProviderKind};

    #[test]
    fn rate_limit_rejection_sets_retry_after() {
        let response =
            InboundRejection(InboundAuthError::RateLimitExceeded { retry_after_ms: 1500 })
                .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }

    #[test]
    fn signature_mismatch_is_unauthorized() {
        let response = InboundRejection(InboundAuthError::SignatureMismatch).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn gateway_errors_map_to_statuses() {
        let cases = [
            (
                GatewayError::UnsupportedAction {
                    provider: ProviderKind::Payment,
                    action: GatewayAction::CreateRecord,
                },
                StatusCode::BAD_REQUEST,
            ),
            (GatewayError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                GatewayError::Configuration("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                GatewayError::ProviderEnvelope {
                    code: "E".to_string(),
                    message: "m".to_string(),
                    request_id: None,
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(GatewayApiError(err).into_response().status(), status);
        }
    }
}
