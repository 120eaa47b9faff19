//! Signing error types.

use thiserror::Error;

/// Errors raised while building or signing a request.
///
/// Every variant is a configuration problem: retrying without fixing the
/// credential or profile produces the same failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Credential has no secret key.
    #[error("Credential '{0}' has no secret key configured")]
    MissingSecret(String),

    /// Credential has no secret id / access key id.
    #[error("Credential '{0}' has no secret id configured")]
    MissingSecretId(String),

    /// Derived-key signer needs a service name and none was supplied.
    #[error("Signing context is missing the service name")]
    MissingService,

    /// Keyed hash rejected the key material.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

impl SigningError {
    /// Signing failures are configuration errors and never retryable.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_names_credential() {
        let err = SigningError::MissingSecret("aliyun-dns".to_string());
        assert_eq!(
            err.to_string(),
            "Credential 'aliyun-dns' has no secret key configured"
        );
    }

    #[test]
    fn signing_errors_are_not_retryable() {
        assert!(!SigningError::MissingService.is_retryable());
        assert!(!SigningError::MissingSecret("x".into()).is_retryable());
    }
}
