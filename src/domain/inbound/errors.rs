//! Inbound authentication errors.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that reject an inbound signed API call.
#[derive(Debug, Error)]
pub enum InboundAuthError {
    /// A required authentication header was absent.
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// The app key has no configured secret. Fails closed.
    #[error("Unknown credential")]
    UnknownCredential(String),

    /// Recomputed signature did not match.
    #[error("Invalid signature")]
    SignatureMismatch,

    /// `timestamp` parameter absent or not an integer.
    #[error("Invalid timestamp")]
    MissingTimestamp,

    /// `timestamp` outside the replay window.
    #[error("Invalid timestamp")]
    ReplayWindowExceeded { skew_secs: i64 },

    /// Per-credential or global request budget exhausted.
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after_ms: u64 },

    /// Request parameters could not be read.
    #[error("Invalid parameters: {0}")]
    MalformedParams(String),

    /// Credential lookup failed.
    #[error("Credential store unavailable: {0}")]
    CredentialStore(String),
}

impl InboundAuthError {
    /// Returns true if the caller may retry the identical request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InboundAuthError::RateLimitExceeded { .. } | InboundAuthError::CredentialStore(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            InboundAuthError::MissingHeader(_)
            | InboundAuthError::UnknownCredential(_)
            | InboundAuthError::SignatureMismatch
            | InboundAuthError::MissingTimestamp
            | InboundAuthError::ReplayWindowExceeded { .. } => StatusCode::UNAUTHORIZED,
            InboundAuthError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            InboundAuthError::MalformedParams(_) => StatusCode::BAD_REQUEST,
            InboundAuthError::CredentialStore(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable code for the error response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            InboundAuthError::MissingHeader(_) => "MISSING_CREDENTIALS",
            InboundAuthError::UnknownCredential(_) => "UNKNOWN_CREDENTIAL",
            InboundAuthError::SignatureMismatch => "INVALID_SIGNATURE",
            InboundAuthError::MissingTimestamp | InboundAuthError::ReplayWindowExceeded { .. } => {
                "INVALID_TIMESTAMP"
            }
            InboundAuthError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            InboundAuthError::MalformedParams(_) => "INVALID_PARAMS",
            InboundAuthError::CredentialStore(_) => "SERVICE_UNAVAILABLE",
        }
    }
}
