//! Rate limiting configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Inbound rate limiting configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fixed window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Requests per window for apps without their own qps
    pub default_qps: Option<u32>,

    /// Requests per window across all callers
    pub global_limit: Option<u32>,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Validate rate limiting configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_ms == 0 || self.window_ms > 3_600_000 {
            return Err(ValidationError::InvalidRateLimitWindow);
        }
        if self.default_qps == Some(0) {
            return Err(ValidationError::InvalidRateLimit("default_qps".to_string()));
        }
        if self.global_limit == Some(0) {
            return Err(ValidationError::InvalidRateLimit("global_limit".to_string()));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_ms: default_window_ms(),
            default_qps: None,
            global_limit: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.window(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = RateLimitConfig {
            default_qps: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RateLimitConfig {
            window_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRateLimitWindow));
    }
}
