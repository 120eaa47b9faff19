//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid socket address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Replay window must be between 1 and 3600 seconds")]
    InvalidReplayWindow,

    #[error("Lock TTL must be positive and exceed the lock wait")]
    InvalidLockTiming,

    #[error("Rate limit window must be between 1 ms and 1 hour")]
    InvalidRateLimitWindow,

    #[error("Rate limit must be positive: {0}")]
    InvalidRateLimit(String),

    #[error("Provider '{0}' is missing its secret id or secret key")]
    IncompleteProviderCredential(&'static str),

    #[error("Duplicate inbound app key: {0}")]
    DuplicateAppKey(String),

    #[error("Inbound app '{0}' has an empty secret")]
    EmptyAppSecret(String),
}
