//! HTTP client adapters.
//!
//! - `ReqwestHttpClient` - Production transport over reqwest
//! - `RecordingHttpClient` - Scripted responses plus request capture for tests

mod recording;
mod reqwest_client;

pub use recording::RecordingHttpClient;
pub use reqwest_client::{ReqwestHttpClient, ReqwestHttpClientConfig};
