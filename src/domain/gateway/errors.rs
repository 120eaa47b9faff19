//! Outbound gateway errors.

use thiserror::Error;

use super::{GatewayAction, ProviderKind};
use crate::domain::signing::SigningError;

/// Errors returned by an outbound gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Provider or credential configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Signing refused the credential.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The provider has no route for the action.
    #[error("Action '{action}' is not supported by provider '{provider}'")]
    UnsupportedAction {
        provider: ProviderKind,
        action: GatewayAction,
    },

    /// Action input could not be turned into provider parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The provider answered with an error envelope.
    #[error("Provider error {code}: {message}")]
    ProviderEnvelope {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// Non-success HTTP status without a recognizable error envelope.
    #[error("Unexpected HTTP status {status}")]
    Http { status: u16, body: String },

    /// The call did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not the envelope the provider documents.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Returns true if a caller may retry the call later.
    ///
    /// The gateway itself never retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Transport(_) => true,
            GatewayError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true for errors raised before any network I/O because the
    /// gateway is misconfigured.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GatewayError::Configuration(_) | GatewayError::Signing(_)
        )
    }
}
