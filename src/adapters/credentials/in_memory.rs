//! In-memory credential store.
//!
//! Holds provider and inbound app credentials loaded at startup. Rotation
//! requires a restart; the store itself is read-only once built.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::gateway::ProviderKind;
use crate::domain::signing::Credential;
use crate::ports::{AppCredential, CredentialStore, CredentialStoreError};

/// Credential store backed by two hash maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    providers: HashMap<ProviderKind, Credential>,
    apps: HashMap<String, AppCredential>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the credential used to sign calls to `provider`.
    pub fn with_provider(mut self, provider: ProviderKind, credential: Credential) -> Self {
        self.providers.insert(provider, credential);
        self
    }

    /// Registers an inbound app key with an optional per-app QPS.
    pub fn with_app(
        mut self,
        app_key: impl Into<String>,
        secret: impl Into<String>,
        qps: Option<u32>,
    ) -> Self {
        let app_key = app_key.into();
        let credential = Credential::new(
            format!("app:{}", app_key),
            app_key.clone(),
            secret,
            "inbound",
        );
        self.apps.insert(app_key, AppCredential { credential, qps });
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn provider_credential(
        &self,
        provider: ProviderKind,
    ) -> Result<Credential, CredentialStoreError> {
        self.providers
            .get(&provider)
            .cloned()
            .ok_or_else(|| CredentialStoreError::NotConfigured(provider.to_string()))
    }

    async fn app_credential(
        &self,
        app_key: &str,
    ) -> Result<Option<AppCredential>, CredentialStoreError> {
        Ok(self.apps.get(app_key).cloned())
    }
}
