//! Recording HTTP client for tests and local dry runs.
//!
//! Replays scripted responses in order and captures every request so tests
//! can assert on the signed headers that would have gone over the wire.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Fake transport returning queued responses.
///
/// When the queue is empty every call answers `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and JSON body.
    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.push(Ok(HttpResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
        self
    }

    /// Queues a transport failure.
    pub fn fail_with(self, error: HttpError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<HttpResponse, HttpError>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl HttpClient for RecordingHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| HttpError::Other("recording client poisoned".to_string()))?
            .pop_front();

        next.unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                body: b"{}".to_vec(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::time::Duration;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: Method::POST,
            url: url.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn replays_responses_in_order_then_defaults() {
        let client = RecordingHttpClient::new()
            .respond_json(200, serde_json::json!({"a": 1}))
            .fail_with(HttpError::Timeout);

        assert_eq!(client.send(request("https://a/")).await.unwrap().status, 200);
        assert_eq!(client.send(request("https://b/")).await.unwrap_err(), HttpError::Timeout);
        assert_eq!(client.send(request("https://c/")).await.unwrap().body, b"{}");
        assert_eq!(client.request_count(), 3);
        assert_eq!(client.requests()[1].url, "https://b/");
    }
}
