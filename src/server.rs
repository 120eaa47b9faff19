//! Service wiring: builds adapters from [`AppConfig`] and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::adapters::http::{app_router, AppState};
use crate::adapters::{
    InMemoryCredentialStore, InMemoryRateLimiter, InMemoryTransactionLock,
    InMemoryTransactionRepository, RedisRateLimiter, RedisTransactionLock, ReqwestHttpClient,
    ReqwestHttpClientConfig, TracingEventPublisher, TracingNotifyListener,
};
use crate::application::{
    HandleNotifyHandler, InboundGuard, InboundGuardConfig, NotifyConfig, OutboundGateway,
};
use crate::config::{AppConfig, ValidationError};
use crate::domain::inbound::InboundSignatureVerifier;
use crate::ports::{HttpError, RateLimiter, TransactionLock};

/// Failures while starting the service.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("redis unavailable: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis connection timed out after {0:?}")]
    RedisTimeout(Duration),

    #[error("http client: {0}")]
    HttpClient(#[from] HttpError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared-state adapters; Redis when configured, in-process otherwise.
struct SharedState {
    lock: Arc<dyn TransactionLock>,
    limiter: Arc<dyn RateLimiter>,
}

/// Bound listener plus router, ready to serve.
pub struct Server {
    listener: TcpListener,
    state: AppState,
    request_timeout: Duration,
}

impl Server {
    /// Validates `config`, builds every adapter and binds the listener.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        config.validate()?;

        let state = build_state(config).await?;
        let addr = config.server.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| StartupError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state,
            request_timeout: config.server.request_timeout(),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    /// Serves until ctrl-c.
    pub async fn run(self) -> Result<(), StartupError> {
        tracing::info!(addr = ?self.local_addr(), "Signing gateway listening");
        let router = app_router(self.state, self.request_timeout);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(StartupError::Serve)
    }
}

/// Builds the application services from configuration.
pub async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let credentials = Arc::new(credential_store(config));
    let shared = shared_state(config).await?;

    let http = Arc::new(ReqwestHttpClient::new(
        ReqwestHttpClientConfig::default().with_timeout(config.security.outbound_timeout()),
    )?);

    let mut gateway = OutboundGateway::new(
        credentials.clone(),
        http,
        Arc::new(TracingEventPublisher::new()),
    )
    .with_timeout(config.security.outbound_timeout());
    for (kind, provider) in config.providers.configured() {
        gateway = gateway.with_profile(provider.profile(kind));
    }

    let verifier =
        InboundSignatureVerifier::new(credentials.clone(), config.security.replay_window());
    let limiter: Arc<dyn RateLimiter> = shared.limiter;
    let guard_config = if config.rate_limit.enabled {
        InboundGuardConfig {
            global_limit: config.rate_limit.global_limit,
            default_qps: config.rate_limit.default_qps,
        }
    } else {
        InboundGuardConfig::default()
    };
    let guard = InboundGuard::new(verifier, limiter, credentials, guard_config);

    let notify = HandleNotifyHandler::new(
        shared.lock,
        Arc::new(InMemoryTransactionRepository::new()),
        Arc::new(TracingNotifyListener::new()),
        NotifyConfig {
            lock_ttl: config.security.lock_ttl(),
            lock_wait: config.security.lock_wait(),
            poll_interval: config.security.lock_poll(),
        },
    );

    Ok(AppState {
        gateway: Arc::new(gateway),
        guard: Arc::new(guard),
        notify: Arc::new(notify),
    })
}

fn credential_store(config: &AppConfig) -> InMemoryCredentialStore {
    let mut store = InMemoryCredentialStore::new();
    for (kind, provider) in config.providers.configured() {
        store = store.with_provider(kind, provider.credential(kind));
    }
    for app in &config.inbound.apps {
        store = store.with_app(app.app_key.clone(), app.secret.expose_secret().clone(), app.qps);
    }

    tracing::info!(
        providers = store.provider_count(),
        apps = store.app_count(),
        "Credential store loaded"
    );
    store
}

async fn shared_state(config: &AppConfig) -> Result<SharedState, StartupError> {
    let window = config.rate_limit.window();

    let url = match config.redis.url.as_deref() {
        Some(url) if config.redis.is_enabled() => url,
        _ => {
            tracing::warn!("No Redis URL configured; lock and rate limits are per-process");
            return Ok(SharedState {
                lock: Arc::new(InMemoryTransactionLock::new()),
                limiter: Arc::new(InMemoryRateLimiter::new(window)),
            });
        }
    };

    let client = redis::Client::open(url)?;
    let timeout = config.redis.timeout();
    let conn = tokio::time::timeout(timeout, client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| StartupError::RedisTimeout(timeout))??;
    tracing::info!("Connected to Redis");

    Ok(SharedState {
        lock: Arc::new(RedisTransactionLock::new(conn.clone())),
        limiter: Arc::new(RedisRateLimiter::new(conn, window)),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
