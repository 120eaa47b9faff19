//! Provider acknowledgements.

use axum::http::StatusCode;
use serde_json::json;

use super::notify_data::NotifyProvider;

/// Response returned to the provider for a notification.
///
/// A success ack stops redelivery; a retry ack asks the provider to deliver
/// the notification again later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyAck {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl NotifyAck {
    pub fn success(provider: NotifyProvider) -> Self {
        match provider {
            NotifyProvider::Alipay => Self {
                status: StatusCode::OK,
                content_type: "text/plain; charset=utf-8",
                body: "success".to_string(),
            },
            NotifyProvider::Wechat => Self {
                status: StatusCode::OK,
                content_type: "application/json",
                body: json!({"code": "SUCCESS", "message": "成功"}).to_string(),
            },
        }
    }

    pub fn retry(provider: NotifyProvider, message: &str) -> Self {
        match provider {
            NotifyProvider::Alipay => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                content_type: "text/plain; charset=utf-8",
                body: "failure".to_string(),
            },
            NotifyProvider::Wechat => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                content_type: "application/json",
                body: json!({"code": "FAIL", "message": message}).to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
