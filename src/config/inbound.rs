//! Inbound app credentials

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashSet;

use super::error::ValidationError;

/// One machine-to-machine caller.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundAppConfig {
    pub app_key: String,
    pub secret: SecretString,
    /// Requests per rate-limit window; falls back to `rate_limit.default_qps`
    pub qps: Option<u32>,
}

/// Inbound configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundConfig {
    #[serde(default)]
    pub apps: Vec<InboundAppConfig>,
}

impl InboundConfig {
    /// Validate inbound configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for app in &self.apps {
            if app.app_key.trim().is_empty() {
                return Err(ValidationError::MissingRequired("INBOUND__APPS[].APP_KEY"));
            }
            if app.secret.expose_secret().is_empty() {
                return Err(ValidationError::EmptyAppSecret(app.app_key.clone()));
            }
            if app.qps == Some(0) {
                return Err(ValidationError::InvalidRateLimit(app.app_key.clone()));
            }
            if !seen.insert(app.app_key.as_str()) {
                return Err(ValidationError::DuplicateAppKey(app.app_key.clone()));
            }
        }
        Ok(())
    }
}
