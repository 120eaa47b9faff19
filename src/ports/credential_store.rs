//! CredentialStore port - Lookup of provider and inbound app credentials.
//!
//! Credentials are issued and rotated outside this service; the gateway and
//! the inbound verifier only read them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::gateway::ProviderKind;
use crate::domain::signing::Credential;

/// An inbound app's credential plus its admission budget.
#[derive(Debug, Clone)]
pub struct AppCredential {
    pub credential: Credential,
    /// Requests per rate-limit window; `None` uses the configured default.
    pub qps: Option<u32>,
}

/// Port for credential lookup.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Credential used to sign outbound calls to `provider`.
    ///
    /// # Errors
    ///
    /// `NotConfigured` if the provider has no credential.
    async fn provider_credential(
        &self,
        provider: ProviderKind,
    ) -> Result<Credential, CredentialStoreError>;

    /// Credential for an inbound app key, or `None` if the key is unknown.
    async fn app_credential(
        &self,
        app_key: &str,
    ) -> Result<Option<AppCredential>, CredentialStoreError>;
}

/// Errors from credential lookup.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("No credential configured for '{0}'")]
    NotConfigured(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn CredentialStore) {}

    #[test]
    fn not_configured_names_provider() {
        let err = CredentialStoreError::NotConfigured(ProviderKind::TencentDns.to_string());
        assert_eq!(err.to_string(), "No credential configured for 'tencent_dns'");
    }
}
