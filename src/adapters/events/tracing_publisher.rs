//! Log-based event sinks used by the production binary.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::notify::NotifyData;
use crate::ports::{GatewayEventPublisher, GatewayRequestCreated, NotifyListener};

/// Publishes `gateway.request_created` as an info-level log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GatewayEventPublisher for TracingEventPublisher {
    async fn request_created(&self, event: GatewayRequestCreated) -> Result<(), DomainError> {
        tracing::info!(
            event_type = GatewayRequestCreated::EVENT_TYPE,
            request_id = %event.request_id,
            order_no = %event.order_no,
            provider = %event.provider,
            action = %event.action,
            provider_action = %event.provider_action,
            status = event.status,
            elapsed_ms = event.elapsed_ms,
            "Gateway request created"
        );
        Ok(())
    }
}

/// Default listener: records the settlement in the log only.
///
/// Deployments with business side effects (fulfilment, ledger entries)
/// supply their own `NotifyListener`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifyListener;

impl TracingNotifyListener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyListener for TracingNotifyListener {
    async fn on_paid(&self, notify: &NotifyData) -> Result<(), DomainError> {
        tracing::info!(
            provider = %notify.provider(),
            out_trade_no = notify.out_trade_no(),
            trade_no = notify.trade_no(),
            amount = ?notify.amount(),
            "Payment settled"
        );
        Ok(())
    }

    async fn on_refunded(&self, notify: &NotifyData) -> Result<(), DomainError> {
        tracing::info!(
            provider = %notify.provider(),
            out_trade_no = notify.out_trade_no(),
            refund_no = ?notify.refund_no(),
            amount = ?notify.amount(),
            "Refund settled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrderNo, RequestId, Timestamp};
    use crate::domain::gateway::{GatewayAction, ProviderKind};
    use crate::domain::notify::NotifyProvider;

    #[tokio::test]
    async fn publisher_accepts_events() {
        let event = GatewayRequestCreated {
            request_id: RequestId::new(),
            order_no: OrderNo::new("Q1").unwrap(),
            provider: ProviderKind::Payment,
            action: GatewayAction::QueryOrder,
            provider_action: "trade.query".to_string(),
            status: 200,
            elapsed_ms: 3,
            occurred_at: Timestamp::now(),
        };

        assert!(TracingEventPublisher::new().request_created(event).await.is_ok());
    }

    #[tokio::test]
    async fn listener_accepts_both_outcomes() {
        let body = b"out_trade_no=P1&trade_no=T1&trade_status=TRADE_SUCCESS";
        let notify = NotifyData::parse(NotifyProvider::Alipay, body).unwrap();
        let listener = TracingNotifyListener::new();

        assert!(listener.on_paid(&notify).await.is_ok());
        assert!(listener.on_refunded(&notify).await.is_ok());
    }
}
