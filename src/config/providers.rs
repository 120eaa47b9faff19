//! Outbound provider configuration
//!
//! Each provider section is optional; a provider without a section has no
//! credential and every call to it fails with a configuration error.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::gateway::{ProviderKind, ProviderProfile};
use crate::domain::signing::Credential;

/// Credentials and endpoint overrides for one provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Access key id / merchant id as the provider sees it
    pub secret_id: String,

    /// Signing secret
    pub secret_key: SecretString,

    /// Endpoint host override (required for the payment gateway)
    pub host: Option<String>,

    /// API version override
    pub api_version: Option<String>,

    /// Region sent to providers that take one
    pub region: Option<String>,
}

impl ProviderConfig {
    fn validate(&self, name: &'static str) -> Result<(), ValidationError> {
        if self.secret_id.trim().is_empty() || self.secret_key.expose_secret().is_empty() {
            return Err(ValidationError::IncompleteProviderCredential(name));
        }
        Ok(())
    }

    /// Signing credential for `kind`.
    pub fn credential(&self, kind: ProviderKind) -> Credential {
        Credential::from_secret(
            kind.as_str(),
            self.secret_id.clone(),
            self.secret_key.clone(),
            kind.as_str(),
        )
    }

    /// Built-in profile for `kind` with this section's overrides applied.
    pub fn profile(&self, kind: ProviderKind) -> ProviderProfile {
        let mut profile = ProviderProfile::for_kind(kind);
        if let Some(host) = &self.host {
            profile = profile.with_host(host.clone());
        }
        if let Some(version) = &self.api_version {
            profile = profile.with_api_version(version.clone());
        }
        if let Some(region) = &self.region {
            profile = profile.with_region(region.clone());
        }
        profile
    }
}

/// All outbound providers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    pub aliyun: Option<ProviderConfig>,
    pub tencent: Option<ProviderConfig>,
    pub payment: Option<ProviderConfig>,
}

impl ProvidersConfig {
    /// Configured sections paired with their provider kind.
    pub fn configured(&self) -> Vec<(ProviderKind, &ProviderConfig)> {
        [
            (ProviderKind::AliyunDns, self.aliyun.as_ref()),
            (ProviderKind::TencentDns, self.tencent.as_ref()),
            (ProviderKind::Payment, self.payment.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, section)| section.map(|s| (kind, s)))
        .collect()
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(aliyun) = &self.aliyun {
            aliyun.validate("aliyun")?;
        }
        if let Some(tencent) = &self.tencent {
            tencent.validate("tencent")?;
        }
        if let Some(payment) = &self.payment {
            payment.validate("payment")?;
            if payment.host.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(ValidationError::MissingRequired("PROVIDERS__PAYMENT__HOST"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(host: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            secret_id: "AK".to_string(),
            secret_key: SecretString::new("sk".to_string()),
            host: host.map(str::to_string),
            api_version: None,
            region: Some("ap-guangzhou".to_string()),
        }
    }

    #[test]
    fn test_empty_config_is_valid() {
        assert!(ProvidersConfig::default().validate().is_ok());
        assert!(ProvidersConfig::default().configured().is_empty());
    }

    #[test]
    fn test_payment_requires_host() {
        let config = ProvidersConfig {
            payment: Some(section(None)),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("PROVIDERS__PAYMENT__HOST"))
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = ProvidersConfig {
            aliyun: Some(ProviderConfig {
                secret_key: SecretString::new(String::new()),
                ..section(None)
            }),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::IncompleteProviderCredential("aliyun"))
        );
    }

    #[test]
    fn test_profile_applies_overrides() {
        let profile = section(Some("pay.example.com")).profile(ProviderKind::Payment);
        assert_eq!(profile.host, "pay.example.com");
        assert_eq!(profile.region.as_deref(), Some("ap-guangzhou"));

        let credential = section(None).credential(ProviderKind::TencentDns);
        assert_eq!(credential.secret_id(), "AK");
        assert_eq!(credential.scope(), "tencent_dns");
    }
}
