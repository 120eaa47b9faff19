//! HttpClient port - Minimal HTTP transport used by the outbound gateway.
//!
//! Keeping the transport behind a trait lets the gateway be tested with a
//! recording fake instead of a live provider.

use async_trait::async_trait;
use http::Method;
use std::time::Duration;
use thiserror::Error;

/// A fully built, already signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response; envelope interpretation is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Port for sending HTTP requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends `request` once. Implementations must not retry.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Transport-level failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = HttpRequest {
            method: Method::POST,
            url: "https://example.com/".to_string(),
            headers: vec![("Authorization".to_string(), "HMAC x".to_string())],
            body: Vec::new(),
            timeout: Duration::from_secs(5),
        };

        assert_eq!(request.header("authorization"), Some("HMAC x"));
        assert_eq!(request.header("x-missing"), None);
    }
}
