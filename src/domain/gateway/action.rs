//! Gateway actions and their typed inputs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::errors::GatewayError;

/// Every action the outbound gateway knows how to dispatch.
///
/// Providers map the subset they support to a concrete API action; see
/// [`ProviderKind::route`](super::ProviderKind::route).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayAction {
    CreateOrder,
    Refund,
    QueryOrder,
    QueryRefund,
    QueryRecords,
    CreateRecord,
    ModifyRecord,
    DeleteRecord,
}

impl GatewayAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayAction::CreateOrder => "create_order",
            GatewayAction::Refund => "refund",
            GatewayAction::QueryOrder => "query_order",
            GatewayAction::QueryRefund => "query_refund",
            GatewayAction::QueryRecords => "query_records",
            GatewayAction::CreateRecord => "create_record",
            GatewayAction::ModifyRecord => "modify_record",
            GatewayAction::DeleteRecord => "delete_record",
        }
    }

    /// Prefix of the order number generated for each call of this action.
    pub fn order_prefix(&self) -> &'static str {
        match self {
            GatewayAction::CreateOrder => "P",
            GatewayAction::Refund => "R",
            GatewayAction::QueryOrder | GatewayAction::QueryRefund => "Q",
            GatewayAction::QueryRecords
            | GatewayAction::CreateRecord
            | GatewayAction::ModifyRecord
            | GatewayAction::DeleteRecord => "D",
        }
    }
}

impl fmt::Display for GatewayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayAction {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_string()))
            .map_err(|_| GatewayError::InvalidParams(format!("unknown action '{}'", s)))
    }
}

/// Input for [`GatewayAction::CreateOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub subject: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub notify_url: Option<String>,
}

/// Input for [`GatewayAction::Refund`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub out_trade_no: String,
    /// Refund amount in minor units.
    pub amount: i64,
    /// Original order total in minor units.
    pub total_amount: i64,
    pub reason: Option<String>,
}

/// Input for [`GatewayAction::QueryOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub out_trade_no: String,
}

/// Input for [`GatewayAction::QueryRefund`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundQuery {
    pub out_trade_no: String,
    pub out_refund_no: String,
}

/// Input for [`GatewayAction::QueryRecords`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub domain: String,
    pub subdomain: Option<String>,
    pub record_type: Option<String>,
}

/// A DNS record as the gateway sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub domain: String,
    /// Host part (`www`, `@`).
    pub subdomain: String,
    pub record_type: String,
    pub value: String,
    pub ttl: Option<u32>,
    /// Resolution line; providers fall back to their default line.
    pub line: Option<String>,
}

/// Input for [`GatewayAction::ModifyRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordChange {
    pub record_id: String,
    pub record: DnsRecord,
}

/// Input for [`GatewayAction::DeleteRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub domain: String,
    pub record_id: String,
}

/// Typed input of one gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionInput {
    CreateOrder(OrderRequest),
    Refund(RefundRequest),
    QueryOrder(OrderQuery),
    QueryRefund(RefundQuery),
    QueryRecords(RecordQuery),
    CreateRecord(DnsRecord),
    ModifyRecord(RecordChange),
    DeleteRecord(RecordRef),
}

impl ActionInput {
    /// Decodes the typed input for `action` from a JSON object. Unknown
    /// fields (such as a signing `timestamp`) are ignored.
    pub fn from_json(action: GatewayAction, value: Value) -> Result<Self, GatewayError> {
        fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
            serde_json::from_value(value).map_err(|e| GatewayError::InvalidParams(e.to_string()))
        }

        Ok(match action {
            GatewayAction::CreateOrder => ActionInput::CreateOrder(decode(value)?),
            GatewayAction::Refund => ActionInput::Refund(decode(value)?),
            GatewayAction::QueryOrder => ActionInput::QueryOrder(decode(value)?),
            GatewayAction::QueryRefund => ActionInput::QueryRefund(decode(value)?),
            GatewayAction::QueryRecords => ActionInput::QueryRecords(decode(value)?),
            GatewayAction::CreateRecord => ActionInput::CreateRecord(decode(value)?),
            GatewayAction::ModifyRecord => ActionInput::ModifyRecord(decode(value)?),
            GatewayAction::DeleteRecord => ActionInput::DeleteRecord(decode(value)?),
        })
    }

    pub fn action(&self) -> GatewayAction {
        match self {
            ActionInput::CreateOrder(_) => GatewayAction::CreateOrder,
            ActionInput::Refund(_) => GatewayAction::Refund,
            ActionInput::QueryOrder(_) => GatewayAction::QueryOrder,
            ActionInput::QueryRefund(_) => GatewayAction::QueryRefund,
            ActionInput::QueryRecords(_) => GatewayAction::QueryRecords,
            ActionInput::CreateRecord(_) => GatewayAction::CreateRecord,
            ActionInput::ModifyRecord(_) => GatewayAction::ModifyRecord,
            ActionInput::DeleteRecord(_) => GatewayAction::DeleteRecord,
        }
    }
}
