//! reqwest-backed implementation of the HttpClient port.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::ports::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Configuration for the reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClientConfig {
    /// Upper bound applied when a request carries no tighter timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ReqwestHttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            user_agent: format!("signing-gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ReqwestHttpClientConfig {
    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Sends signed provider requests. Never retries.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Builds the underlying connection pool.
    pub fn new(config: ReqwestHttpClientConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| HttpError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

fn map_send_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_connect() {
        HttpError::Connect(e.to_string())
    } else {
        HttpError::Other(e.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        // reqwest carries its own `http` version; convert through the verb name
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| HttpError::Other(format!("Invalid method: {}", e)))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_send_error)?;

        tracing::debug!(status, bytes = body.len(), "Provider response received");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
