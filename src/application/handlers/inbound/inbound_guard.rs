//! InboundGuard - Admission control for signed machine-to-machine calls.
//!
//! Applies the optional global budget, then the caller's per-credential
//! budget, then signature verification. Limits are checked before any
//! signature is computed.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::inbound::{InboundAuthError, InboundSignatureVerifier, VerifiedRequest};
use crate::ports::{CredentialStore, RateLimitKey, RateLimitResult, RateLimiter};

/// Budgets applied by the guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InboundGuardConfig {
    /// Requests per window across every caller; `None` disables it.
    pub global_limit: Option<u32>,
    /// Per-credential budget for apps without their own `qps`.
    /// `None` leaves such apps unlimited.
    pub default_qps: Option<u32>,
}

/// Rate limiter plus verifier.
pub struct InboundGuard {
    verifier: InboundSignatureVerifier,
    limiter: Arc<dyn RateLimiter>,
    credentials: Arc<dyn CredentialStore>,
    config: InboundGuardConfig,
}

impl InboundGuard {
    pub fn new(
        verifier: InboundSignatureVerifier,
        limiter: Arc<dyn RateLimiter>,
        credentials: Arc<dyn CredentialStore>,
        config: InboundGuardConfig,
    ) -> Self {
        Self {
            verifier,
            limiter,
            credentials,
            config,
        }
    }

    /// Admits or rejects one inbound call.
    ///
    /// # Errors
    ///
    /// - `RateLimitExceeded` - a budget is exhausted; no signature computed
    /// - any error of [`InboundSignatureVerifier::verify`]
    pub async fn check(
        &self,
        app_key: &str,
        signature: &str,
        params: &Map<String, Value>,
        now: Timestamp,
    ) -> Result<VerifiedRequest, InboundAuthError> {
        if let Some(limit) = self.config.global_limit {
            self.admit(&RateLimitKey::global(), limit).await?;
        }

        if let Some(limit) = self.credential_limit(app_key).await {
            self.admit(&RateLimitKey::credential(app_key), limit).await?;
        }

        self.verifier.verify(app_key, signature, params, now).await
    }

    /// Per-app qps, falling back to the default. Unknown apps are not
    /// limited here; the verifier rejects them.
    async fn credential_limit(&self, app_key: &str) -> Option<u32> {
        match self.credentials.app_credential(app_key).await {
            Ok(Some(app)) => app.qps.or(self.config.default_qps),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(app_key = %app_key, error = %e, "Credential lookup failed before rate limiting");
                self.config.default_qps
            }
        }
    }

    async fn admit(&self, key: &RateLimitKey, limit: u32) -> Result<(), InboundAuthError> {
        match self.limiter.attempt(key, limit).await {
            Ok(RateLimitResult::Allowed(_)) => Ok(()),
            Ok(RateLimitResult::Denied(denied)) => {
                tracing::warn!(
                    scope = %denied.scope,
                    key = %key.identifier,
                    limit = denied.limit,
                    retry_after_ms = denied.retry_after_ms,
                    "Inbound rate limit exceeded"
                );
                Err(InboundAuthError::RateLimitExceeded {
                    retry_after_ms: denied.retry_after_ms,
                })
            }
            Err(e) => {
                // Fail open: an unreachable limiter must not take the API down
                tracing::warn!(key = %key.identifier, error = %e, "Rate limiter unavailable, admitting request");
                Ok(())
            }
        }
    }
}
