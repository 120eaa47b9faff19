//! NotifyListener port - Business reaction to settled payments and refunds.
//!
//! Called at most once per terminal state transition: the notify handler
//! checks the persisted status before calling and records the new status
//! after a successful call.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::notify::NotifyData;

#[async_trait]
pub trait NotifyListener: Send + Sync {
    /// The order was paid.
    async fn on_paid(&self, notify: &NotifyData) -> Result<(), DomainError>;

    /// A refund on the order completed.
    async fn on_refunded(&self, notify: &NotifyData) -> Result<(), DomainError>;
}
