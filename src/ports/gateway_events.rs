//! GatewayEventPublisher port - Observability events from the outbound gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, OrderNo, RequestId, Timestamp};
use crate::domain::gateway::{GatewayAction, ProviderKind};

/// Emitted after a provider accepted an outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequestCreated {
    pub request_id: RequestId,
    pub order_no: OrderNo,
    pub provider: ProviderKind,
    pub action: GatewayAction,
    pub provider_action: String,
    pub status: u16,
    pub elapsed_ms: u64,
    pub occurred_at: Timestamp,
}

impl GatewayRequestCreated {
    pub const EVENT_TYPE: &'static str = "gateway.request_created";
}

/// Port for publishing gateway events.
#[async_trait]
pub trait GatewayEventPublisher: Send + Sync {
    async fn request_created(&self, event: GatewayRequestCreated) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn GatewayEventPublisher) {}

    #[test]
    fn event_serializes_with_snake_case_enums() {
        let event = GatewayRequestCreated {
            request_id: RequestId::new(),
            order_no: OrderNo::new("D1").unwrap(),
            provider: ProviderKind::AliyunDns,
            action: GatewayAction::CreateRecord,
            provider_action: "AddDomainRecord".to_string(),
            status: 200,
            elapsed_ms: 12,
            occurred_at: Timestamp::now(),
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["provider"], "aliyun_dns");
        assert_eq!(json["action"], "create_record");
        assert_eq!(json["order_no"], "D1");
    }
}
