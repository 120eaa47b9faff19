//! Inbound request signature verification.
//!
//! Implements HMAC-SHA256 verification of machine-to-machine API calls with
//! a timestamp window to prevent replay attacks.

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::errors::InboundAuthError;
use super::flatten::sign_string;
use crate::domain::foundation::{RequestId, Timestamp};
use crate::domain::signing::encoding::{constant_time_eq, hmac_sha256_hex};
use crate::domain::signing::SigningError;
use crate::ports::CredentialStore;

/// Default accepted clock skew between caller and server.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 60;

/// Raw params longer than this are truncated in the audit log.
const AUDIT_PARAMS_MAX_BYTES: usize = 4096;

/// Parameter carrying the caller's Unix timestamp (seconds).
const TIMESTAMP_PARAM: &str = "timestamp";

/// A request that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// Identifier assigned to this attempt, also present in the audit log.
    pub request_id: RequestId,
    pub app_key: String,
    /// Caller-supplied timestamp.
    pub timestamp: Timestamp,
}

/// Computes the expected lower-case hex signature for `params`.
pub fn compute_signature(secret: &[u8], params: &Map<String, Value>) -> Result<String, SigningError> {
    hmac_sha256_hex(secret, sign_string(params).as_bytes())
}

/// Verifier for inbound signed API calls.
pub struct InboundSignatureVerifier {
    credentials: Arc<dyn CredentialStore>,
    replay_window_secs: i64,
}

impl InboundSignatureVerifier {
    pub fn new(credentials: Arc<dyn CredentialStore>, replay_window: Duration) -> Self {
        Self {
            credentials,
            replay_window_secs: i64::try_from(replay_window.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn with_default_window(credentials: Arc<dyn CredentialStore>) -> Self {
        Self::new(
            credentials,
            Duration::from_secs(DEFAULT_REPLAY_WINDOW_SECS),
        )
    }

    /// Verifies a signed call.
    ///
    /// # Verification Steps
    ///
    /// 1. Log the attempt (app key, raw params, request id)
    /// 2. Look up the secret for `app_key`; unknown keys fail closed
    /// 3. Flatten, sort and join params into the sign string
    /// 4. Recompute HMAC-SHA256 and compare in constant time
    /// 5. Check `timestamp` is within the replay window of `now`
    ///
    /// # Errors
    ///
    /// - `UnknownCredential` - no secret configured for `app_key`
    /// - `SignatureMismatch` - recomputed signature differs
    /// - `MissingTimestamp` - `timestamp` absent or not an integer
    /// - `ReplayWindowExceeded` - `timestamp` too far from `now`
    /// - `CredentialStore` - credential lookup failed
    pub async fn verify(
        &self,
        app_key: &str,
        signature: &str,
        raw_params: &Map<String, Value>,
        now: Timestamp,
    ) -> Result<VerifiedRequest, InboundAuthError> {
        let request_id = RequestId::new();

        tracing::info!(
            request_id = %request_id,
            app_key = %app_key,
            raw_params = %audit_params(raw_params),
            "Inbound signature verification attempt"
        );

        let app = self
            .credentials
            .app_credential(app_key)
            .await
            .map_err(|e| InboundAuthError::CredentialStore(e.to_string()))?
            .ok_or_else(|| {
                tracing::warn!(request_id = %request_id, app_key = %app_key, "Unknown app key");
                InboundAuthError::UnknownCredential(app_key.to_string())
            })?;

        // An app without a secret is treated like an unknown one.
        let secret = app.credential.secret_bytes().map_err(|_| {
            tracing::warn!(request_id = %request_id, app_key = %app_key, "App key has no secret");
            InboundAuthError::UnknownCredential(app_key.to_string())
        })?;

        let expected = compute_signature(secret, raw_params)
            .map_err(|_| InboundAuthError::UnknownCredential(app_key.to_string()))?;
        let supplied = signature.trim().to_ascii_lowercase();

        if !constant_time_eq(expected.as_bytes(), supplied.as_bytes()) {
            tracing::warn!(request_id = %request_id, app_key = %app_key, "Signature mismatch");
            return Err(InboundAuthError::SignatureMismatch);
        }

        let timestamp = self.check_timestamp(raw_params, now).map_err(|e| {
            tracing::warn!(request_id = %request_id, app_key = %app_key, error = %e, "Timestamp rejected");
            e
        })?;

        tracing::debug!(request_id = %request_id, app_key = %app_key, "Inbound signature verified");

        Ok(VerifiedRequest {
            request_id,
            app_key: app_key.to_string(),
            timestamp,
        })
    }

    fn check_timestamp(
        &self,
        raw_params: &Map<String, Value>,
        now: Timestamp,
    ) -> Result<Timestamp, InboundAuthError> {
        let secs = match raw_params.get(TIMESTAMP_PARAM) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or(InboundAuthError::MissingTimestamp)?;

        let skew_secs = now.as_unix_secs().saturating_sub(secs);
        if skew_secs.saturating_abs() > self.replay_window_secs {
            return Err(InboundAuthError::ReplayWindowExceeded { skew_secs });
        }

        Timestamp::from_unix_secs(secs).ok_or(InboundAuthError::MissingTimestamp)
    }
}

/// Raw params rendered for the audit log, cut at a char boundary.
fn audit_params(raw_params: &Map<String, Value>) -> String {
    let rendered = Value::Object(raw_params.clone()).to_string();
    if rendered.len() <= AUDIT_PARAMS_MAX_BYTES {
        return rendered;
    }
    let mut end = AUDIT_PARAMS_MAX_BYTES;
    while !rendered.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &rendered[..end])
}
