//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. An optional `config/gateway.{toml,yaml,json}` file
//! is overlaid by environment variables with the `SIGNING_GATEWAY` prefix;
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use signing_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod inbound;
mod providers;
mod rate_limit;
mod redis;
mod security;
mod server;

pub use error::{ConfigError, ValidationError};
pub use inbound::{InboundAppConfig, InboundConfig};
pub use providers::{ProviderConfig, ProvidersConfig};
pub use rate_limit::RateLimitConfig;
pub use redis::RedisConfig;
pub use security::SecurityConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SIGNING_GATEWAY";

/// Optional configuration file, extension picked by the `config` crate.
pub const CONFIG_FILE: &str = "config/gateway";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// single-process gateway with no providers and no inbound apps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration (lock + rate-limit counters)
    #[serde(default)]
    pub redis: RedisConfig,

    /// Replay window, lock timing, outbound timeout
    #[serde(default)]
    pub security: SecurityConfig,

    /// Inbound rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outbound provider credentials
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Inbound app credentials
    #[serde(default)]
    pub inbound: InboundConfig,
}

impl AppConfig {
    /// Load configuration from the optional file and environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `config/gateway.*` if present
    /// 3. Reads environment variables with `SIGNING_GATEWAY` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SIGNING_GATEWAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SIGNING_GATEWAY__PROVIDERS__ALIYUN__SECRET_ID=...` -> `providers.aliyun.secret_id`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redis.validate()?;
        self.security.validate()?;
        self.rate_limit.validate()?;
        self.providers.validate()?;
        self.inbound.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
