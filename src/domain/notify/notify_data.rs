//! Normalized payment/refund notification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::errors::NotifyError;
use super::{alipay, wechat};

/// Payment providers that deliver asynchronous notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyProvider {
    Alipay,
    Wechat,
}

impl NotifyProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyProvider::Alipay => "alipay",
            NotifyProvider::Wechat => "wechat",
        }
    }
}

impl fmt::Display for NotifyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifyProvider {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alipay" => Ok(NotifyProvider::Alipay),
            "wechat" => Ok(NotifyProvider::Wechat),
            other => Err(NotifyError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Payment state reported by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Awaiting payment or payment in progress.
    Pending,
    Succeeded,
    /// Closed, revoked or failed without payment.
    Closed,
}

/// Refund state reported by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundState {
    Processing,
    Succeeded,
    /// Closed or abnormal; the money did not go back.
    Failed,
}

/// Immutable, provider-independent view of one notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyData {
    pub(super) provider: NotifyProvider,
    pub(super) raw_payload: Map<String, Value>,
    pub(super) trade_no: String,
    pub(super) out_trade_no: String,
    pub(super) is_refund: bool,
    pub(super) payment_state: Option<PaymentState>,
    pub(super) refund_state: Option<RefundState>,
    pub(super) refund_no: Option<String>,
    pub(super) amount: Option<i64>,
}

impl NotifyData {
    /// Parses a raw callback body from `provider`.
    ///
    /// # Errors
    ///
    /// `NotifyError::Malformed` if the body is not a recognizable callback.
    pub fn parse(provider: NotifyProvider, body: &[u8]) -> Result<Self, NotifyError> {
        match provider {
            NotifyProvider::Alipay => alipay::parse(body),
            NotifyProvider::Wechat => wechat::parse(body),
        }
    }

    pub fn provider(&self) -> NotifyProvider {
        self.provider
    }

    /// The callback fields as received.
    pub fn raw_payload(&self) -> &Map<String, Value> {
        &self.raw_payload
    }

    /// Provider-side transaction number.
    pub fn trade_no(&self) -> &str {
        &self.trade_no
    }

    /// Merchant order number; the lock and persistence key.
    pub fn out_trade_no(&self) -> &str {
        &self.out_trade_no
    }

    pub fn is_refund(&self) -> bool {
        self.is_refund
    }

    pub fn payment_state(&self) -> Option<PaymentState> {
        self.payment_state
    }

    pub fn refund_state(&self) -> Option<RefundState> {
        self.refund_state
    }

    pub fn is_pay_success(&self) -> bool {
        !self.is_refund && self.payment_state == Some(PaymentState::Succeeded)
    }

    pub fn is_refund_success(&self) -> bool {
        self.is_refund && self.refund_state == Some(RefundState::Succeeded)
    }

    /// Merchant refund number, when the notification is about a refund.
    pub fn refund_no(&self) -> Option<&str> {
        self.refund_no.as_deref()
    }

    /// Amount in minor units (order total for payments, refund amount for
    /// refunds), when reported.
    pub fn amount(&self) -> Option<i64> {
        self.amount
    }
}
