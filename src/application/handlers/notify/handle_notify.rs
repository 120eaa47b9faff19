//! HandleNotifyHandler - Exactly-once processing of provider callbacks.
//!
//! Received -> Locked -> Dispatched -> Released -> Acknowledged.
//!
//! The per-order lock serializes concurrent deliveries; the persisted
//! transaction status makes redeliveries no-ops. The handler body is
//! cancelled before the lock TTL runs out, and status writes are
//! compare-and-set, so a delivery that outlives its lock cannot repeat a
//! side effect. The provider always gets a success ack unless the lock could
//! not be taken, in which case it is asked to redeliver.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::DomainError;
use crate::domain::notify::{
    NotifyAck, NotifyData, NotifyError, NotifyProvider, PaymentState, RefundState,
};
use crate::ports::{
    LockHandle, NotifyListener, TransactionLock, TransactionRecord, TransactionRepository,
    TransactionStatus,
};

/// Lock timing for notification handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Lock TTL; bounds how long a crashed holder blocks an order.
    pub lock_ttl: Duration,
    /// How long to keep retrying acquisition before asking for redelivery.
    pub lock_wait: Duration,
    /// Pause between acquisition attempts.
    pub poll_interval: Duration,
}

impl NotifyConfig {
    /// Deadline for the handler body: four fifths of the lock TTL, so the
    /// body is cancelled while the lock is still held.
    pub fn handler_deadline(&self) -> Duration {
        self.lock_ttl - self.lock_ttl / 5
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_secs(10),
            lock_wait: Duration::from_secs(3),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// What handling a notification amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDisposition {
    /// Payment recorded and listener invoked.
    Paid,
    /// Refund recorded and listener invoked.
    Refunded,
    /// Payment closed without settlement.
    Closed,
    /// Refund closed or abnormal.
    RefundFailed,
    /// Redelivery of an already recorded terminal state.
    AlreadyProcessed,
    /// Non-terminal state (awaiting payment, refund processing).
    Ignored,
    /// Body was not a recognizable callback.
    Malformed,
    /// Handler body failed or panicked; logged with an alert marker.
    Failed,
    /// Lock not taken; provider asked to redeliver.
    Retry,
}

/// Ack to return plus the disposition for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub ack: NotifyAck,
    pub disposition: NotifyDisposition,
}

/// Handler for provider payment/refund callbacks.
pub struct HandleNotifyHandler {
    lock: Arc<dyn TransactionLock>,
    repository: Arc<dyn TransactionRepository>,
    listener: Arc<dyn NotifyListener>,
    config: NotifyConfig,
}

impl HandleNotifyHandler {
    pub fn new(
        lock: Arc<dyn TransactionLock>,
        repository: Arc<dyn TransactionRepository>,
        listener: Arc<dyn NotifyListener>,
        config: NotifyConfig,
    ) -> Self {
        Self {
            lock,
            repository,
            listener,
            config,
        }
    }

    /// Handles one raw callback body. Never fails; every outcome maps to an ack.
    pub async fn handle(&self, provider: NotifyProvider, body: &[u8]) -> NotifyOutcome {
        // 1. Received
        let notify = match NotifyData::parse(provider, body) {
            Ok(notify) => notify,
            Err(e) => {
                tracing::warn!(
                    provider = %provider,
                    error = %e,
                    body = %String::from_utf8_lossy(body),
                    "Malformed notification acknowledged"
                );
                return outcome(NotifyAck::success(provider), NotifyDisposition::Malformed);
            }
        };

        tracing::info!(
            provider = %provider,
            out_trade_no = notify.out_trade_no(),
            trade_no = notify.trade_no(),
            is_refund = notify.is_refund(),
            "Notification received"
        );

        // 2. Locked
        let handle = match self.acquire(notify.out_trade_no()).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(
                    out_trade_no = notify.out_trade_no(),
                    error = %e,
                    "Notification lock not acquired, requesting redelivery"
                );
                return outcome(
                    NotifyAck::retry(provider, &e.to_string()),
                    NotifyDisposition::Retry,
                );
            }
        };

        // 3. Dispatched, bounded by the deadline and with panics contained so
        // the lock is always released
        let deadline = self.config.handler_deadline();
        let body = AssertUnwindSafe(self.dispatch(&notify)).catch_unwind();
        let result = match tokio::time::timeout(deadline, body).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(NotifyError::Panicked(panic_message(&*panic))),
            Err(_) => Err(NotifyError::HandlerTimeout(deadline)),
        };

        // 4. Released
        if let Err(e) = self.lock.release(handle).await {
            tracing::warn!(out_trade_no = notify.out_trade_no(), error = %e, "Failed to release notification lock");
        }

        // 5. Acknowledged
        match result {
            Ok(disposition) => {
                tracing::info!(
                    out_trade_no = notify.out_trade_no(),
                    disposition = ?disposition,
                    "Notification handled"
                );
                outcome(NotifyAck::success(provider), disposition)
            }
            Err(e) => {
                tracing::error!(
                    alert = true,
                    provider = %provider,
                    out_trade_no = notify.out_trade_no(),
                    trade_no = notify.trade_no(),
                    error = %e,
                    "Notification handler failed"
                );
                outcome(NotifyAck::success(provider), NotifyDisposition::Failed)
            }
        }
    }

    /// Polls the lock until it is taken or `lock_wait` elapses.
    async fn acquire(&self, out_trade_no: &str) -> Result<LockHandle, NotifyError> {
        let key = format!("notify:{}", out_trade_no);
        let deadline = tokio::time::Instant::now() + self.config.lock_wait;

        loop {
            match self.lock.acquire(&key, self.config.lock_ttl).await {
                Ok(Some(handle)) => return Ok(handle),
                Ok(None) => {}
                Err(e) => return Err(NotifyError::LockUnavailable(e.to_string())),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(NotifyError::LockContention(out_trade_no.to_string()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn dispatch(&self, notify: &NotifyData) -> Result<NotifyDisposition, NotifyError> {
        if notify.is_refund() {
            self.refund_notify(notify).await
        } else {
            self.pay_notify(notify).await
        }
    }

    /// Applies a payment notification. Idempotent on the persisted status.
    async fn pay_notify(&self, notify: &NotifyData) -> Result<NotifyDisposition, NotifyError> {
        let record = self
            .repository
            .find(notify.out_trade_no())
            .await
            .map_err(repository_error)?
            .ok_or_else(|| NotifyError::TransactionNotFound(notify.out_trade_no().to_string()))?;

        match notify.payment_state() {
            Some(PaymentState::Succeeded) => {
                if record.status.is_paid() {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                let applied = self
                    .repository
                    .update_status(
                        notify.out_trade_no(),
                        record.status,
                        TransactionStatus::Paid,
                        Some(notify.trade_no()),
                    )
                    .await
                    .map_err(repository_error)?;
                if !applied {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                self.listener
                    .on_paid(notify)
                    .await
                    .map_err(|e| NotifyError::Listener(e.to_string()))?;
                Ok(NotifyDisposition::Paid)
            }
            Some(PaymentState::Closed) => {
                if record.status != TransactionStatus::Pending {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                let applied = self
                    .repository
                    .update_status(
                        notify.out_trade_no(),
                        TransactionStatus::Pending,
                        TransactionStatus::Closed,
                        Some(notify.trade_no()),
                    )
                    .await
                    .map_err(repository_error)?;
                if !applied {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                Ok(NotifyDisposition::Closed)
            }
            Some(PaymentState::Pending) | None => Ok(NotifyDisposition::Ignored),
        }
    }

    /// Applies a refund notification. Idempotent on the persisted status.
    ///
    /// A terminal refund notice for an order that was never paid is a fault,
    /// not a transition.
    async fn refund_notify(&self, notify: &NotifyData) -> Result<NotifyDisposition, NotifyError> {
        let record = self
            .repository
            .find(notify.out_trade_no())
            .await
            .map_err(repository_error)?
            .ok_or_else(|| NotifyError::TransactionNotFound(notify.out_trade_no().to_string()))?;

        match notify.refund_state() {
            Some(RefundState::Succeeded) => {
                if record.status == TransactionStatus::Refunded {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                if !record.status.is_paid() {
                    return Err(refund_before_payment(&record));
                }
                let applied = self
                    .repository
                    .update_status(
                        notify.out_trade_no(),
                        record.status,
                        TransactionStatus::Refunded,
                        None,
                    )
                    .await
                    .map_err(repository_error)?;
                if !applied {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                self.listener
                    .on_refunded(notify)
                    .await
                    .map_err(|e| NotifyError::Listener(e.to_string()))?;
                Ok(NotifyDisposition::Refunded)
            }
            Some(RefundState::Failed) => {
                if matches!(
                    record.status,
                    TransactionStatus::Refunded | TransactionStatus::RefundFailed
                ) {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                if !record.status.is_paid() {
                    return Err(refund_before_payment(&record));
                }
                let applied = self
                    .repository
                    .update_status(
                        notify.out_trade_no(),
                        record.status,
                        TransactionStatus::RefundFailed,
                        None,
                    )
                    .await
                    .map_err(repository_error)?;
                if !applied {
                    return Ok(NotifyDisposition::AlreadyProcessed);
                }
                Ok(NotifyDisposition::RefundFailed)
            }
            Some(RefundState::Processing) | None => Ok(NotifyDisposition::Ignored),
        }
    }
}

fn outcome(ack: NotifyAck, disposition: NotifyDisposition) -> NotifyOutcome {
    NotifyOutcome { ack, disposition }
}

fn repository_error(e: DomainError) -> NotifyError {
    NotifyError::Repository(e.to_string())
}

fn refund_before_payment(record: &TransactionRecord) -> NotifyError {
    NotifyError::RefundBeforePayment {
        order: record.out_trade_no.clone(),
        status: record.status.to_string(),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::RecordingNotifyListener;
    use crate::adapters::lock::InMemoryTransactionLock;
    use crate::adapters::transactions::InMemoryTransactionRepository;
    use crate::ports::LockError;
    use async_trait::async_trait;
    use axum::http::StatusCode;

    const PAID: &[u8] = b"out_trade_no=P1&trade_no=T1&trade_status=TRADE_SUCCESS&total_amount=88.88";
    const REFUNDED: &[u8] =
        b"out_trade_no=P1&trade_no=T1&trade_status=TRADE_SUCCESS&out_biz_no=R1&refund_fee=10.00";
    const WAITING: &[u8] = b"out_trade_no=P1&trade_no=T1&trade_status=WAIT_BUYER_PAY";
    const CLOSED: &[u8] = b"out_trade_no=P1&trade_no=T1&trade_status=TRADE_CLOSED";

    struct Fixture {
        handler: HandleNotifyHandler,
        lock: Arc<InMemoryTransactionLock>,
        repo: Arc<InMemoryTransactionRepository>,
        listener: Arc<RecordingNotifyListener>,
    }

    async fn fixture(listener: RecordingNotifyListener) -> Fixture {
        let lock = Arc::new(InMemoryTransactionLock::new());
        let repo = Arc::new(InMemoryTransactionRepository::new());
        repo.seed_pending("P1").await;
        let listener = Arc::new(listener);
        let handler = HandleNotifyHandler::new(
            lock.clone(),
            repo.clone(),
            listener.clone(),
            NotifyConfig {
                lock_wait: Duration::from_millis(100),
                poll_interval: Duration::from_millis(10),
                ..NotifyConfig::default()
            },
        );
        Fixture {
            handler,
            lock,
            repo,
            listener,
        }
    }

    async fn status(repo: &InMemoryTransactionRepository) -> TransactionStatus {
        repo.find("P1").await.unwrap().unwrap().status
    }

    // ════════════════════════════════════════════════════════════════════
    // Payment Notifications
    // ════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn pay_success_records_paid_and_acks() {
        let f = fixture(RecordingNotifyListener::new()).await;

        let out = f.handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(out.disposition, NotifyDisposition::Paid);
        assert_eq!(out.ack.body, "success");
        assert_eq!(status(&f.repo).await, TransactionStatus::Paid);
        assert_eq!(f.listener.paid_count(), 1);
        assert!(!f.lock.is_held("notify:P1").await);
    }

    #[tokio::test]
    async fn redelivery_is_a_no_op() {
        let f = fixture(RecordingNotifyListener::new()).await;

        let first = f.handler.handle(NotifyProvider::Alipay, PAID).await;
        let second = f.handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(first.disposition, NotifyDisposition::Paid);
        assert_eq!(second.disposition, NotifyDisposition::AlreadyProcessed);
        assert!(second.ack.is_success());
        assert_eq!(f.listener.paid_count(), 1);
        assert_eq!(f.repo.update_count().await, 1);
    }

    #[tokio::test]
    async fn pending_payment_is_ignored() {
        let f = fixture(RecordingNotifyListener::new()).await;

        let out = f.handler.handle(NotifyProvider::Alipay, WAITING).await;

        assert_eq!(out.disposition, NotifyDisposition::Ignored);
        assert_eq!(status(&f.repo).await, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn closed_payment_records_closed_once() {
        let f = fixture(RecordingNotifyListener::new()).await;

        assert_eq!(
            f.handler.handle(NotifyProvider::Alipay, CLOSED).await.disposition,
            NotifyDisposition::Closed
        );
        assert_eq!(
            f.handler.handle(NotifyProvider::Alipay, CLOSED).await.disposition,
            NotifyDisposition::AlreadyProcessed
        );
        assert_eq!(f.listener.paid_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════
    // Refund Notifications
    // ════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn refund_dispatches_to_refund_path_only() {
        let f = fixture(RecordingNotifyListener::new()).await;
        f.handler.handle(NotifyProvider::Alipay, PAID).await;

        let out = f.handler.handle(NotifyProvider::Alipay, REFUNDED).await;

        assert_eq!(out.disposition, NotifyDisposition::Refunded);
        assert_eq!(status(&f.repo).await, TransactionStatus::Refunded);
        assert_eq!(f.listener.refunded_count(), 1);
        assert_eq!(f.listener.paid_count(), 1);

        let again = f.handler.handle(NotifyProvider::Alipay, REFUNDED).await;
        assert_eq!(again.disposition, NotifyDisposition::AlreadyProcessed);
        assert_eq!(f.listener.refunded_count(), 1);
    }

    #[tokio::test]
    async fn refund_for_pending_order_is_a_fault() {
        let f = fixture(RecordingNotifyListener::new()).await;

        let out = f.handler.handle(NotifyProvider::Alipay, REFUNDED).await;

        assert_eq!(out.disposition, NotifyDisposition::Failed);
        assert!(out.ack.is_success());
        assert_eq!(status(&f.repo).await, TransactionStatus::Pending);
        assert_eq!(f.listener.refunded_count(), 0);
        assert_eq!(f.repo.update_count().await, 0);
        assert!(!f.lock.is_held("notify:P1").await);
    }

    #[tokio::test]
    async fn refund_for_closed_order_is_a_fault() {
        let f = fixture(RecordingNotifyListener::new()).await;
        f.handler.handle(NotifyProvider::Alipay, CLOSED).await;

        let out = f.handler.handle(NotifyProvider::Alipay, REFUNDED).await;

        assert_eq!(out.disposition, NotifyDisposition::Failed);
        assert_eq!(status(&f.repo).await, TransactionStatus::Closed);
        assert_eq!(f.listener.refunded_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════
    // Failure Handling
    // ════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn malformed_body_is_acknowledged() {
        let f = fixture(RecordingNotifyListener::new()).await;

        let out = f.handler.handle(NotifyProvider::Wechat, b"not json").await;

        assert_eq!(out.disposition, NotifyDisposition::Malformed);
        assert_eq!(out.ack.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_order_is_logged_and_acknowledged() {
        let f = fixture(RecordingNotifyListener::new()).await;
        let body = b"out_trade_no=P404&trade_no=T1&trade_status=TRADE_SUCCESS";

        let out = f.handler.handle(NotifyProvider::Alipay, body).await;

        assert_eq!(out.disposition, NotifyDisposition::Failed);
        assert!(out.ack.is_success());
        assert!(!f.lock.is_held("notify:P404").await);
    }

    #[tokio::test]
    async fn listener_error_still_acks_and_releases() {
        let f = fixture(RecordingNotifyListener::new().failing()).await;

        let out = f.handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(out.disposition, NotifyDisposition::Failed);
        assert!(out.ack.is_success());
        assert!(!f.lock.is_held("notify:P1").await);
    }

    #[tokio::test]
    async fn listener_panic_still_acks_and_releases() {
        let f = fixture(RecordingNotifyListener::new().panicking()).await;

        let out = f.handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(out.disposition, NotifyDisposition::Failed);
        assert!(out.ack.is_success());
        assert!(!f.lock.is_held("notify:P1").await);
    }

    #[tokio::test]
    async fn held_lock_requests_redelivery() {
        let f = fixture(RecordingNotifyListener::new()).await;
        let _held = f
            .lock
            .acquire("notify:P1", Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();

        let out = f.handler.handle(NotifyProvider::Wechat, &wechat_paid()).await;

        assert_eq!(out.disposition, NotifyDisposition::Retry);
        assert_eq!(out.ack.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(out.ack.body.contains("FAIL"));
        assert_eq!(f.listener.paid_count(), 0);
    }

    struct DownLock;

    #[async_trait]
    impl TransactionLock for DownLock {
        async fn acquire(&self, _: &str, _: Duration) -> Result<Option<LockHandle>, LockError> {
            Err(LockError::Unavailable("connection refused".to_string()))
        }

        async fn release(&self, _: LockHandle) -> Result<(), LockError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn lock_store_outage_requests_redelivery() {
        let repo = Arc::new(InMemoryTransactionRepository::new());
        repo.seed_pending("P1").await;
        let handler = HandleNotifyHandler::new(
            Arc::new(DownLock),
            repo,
            Arc::new(RecordingNotifyListener::new()),
            NotifyConfig::default(),
        );

        let out = handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(out.disposition, NotifyDisposition::Retry);
        assert_eq!(out.ack.body, "failure");
    }

    // ════════════════════════════════════════════════════════════════════
    // Lock Expiry
    // ════════════════════════════════════════════════════════════════════

    #[test]
    fn handler_deadline_is_inside_lock_ttl() {
        let config = NotifyConfig::default();
        assert_eq!(config.handler_deadline(), Duration::from_secs(8));

        let short = NotifyConfig {
            lock_ttl: Duration::from_millis(100),
            ..NotifyConfig::default()
        };
        assert!(short.handler_deadline() < short.lock_ttl);
    }

    /// Reads a stale `Pending` record while the store has already moved on,
    /// as happens when another delivery wrote between this read and write.
    struct StaleReadRepository {
        inner: InMemoryTransactionRepository,
    }

    #[async_trait]
    impl TransactionRepository for StaleReadRepository {
        async fn find(&self, out_trade_no: &str) -> Result<Option<TransactionRecord>, DomainError> {
            Ok(self
                .inner
                .find(out_trade_no)
                .await?
                .map(|record| TransactionRecord {
                    status: TransactionStatus::Pending,
                    ..record
                }))
        }

        async fn save(&self, record: TransactionRecord) -> Result<(), DomainError> {
            self.inner.save(record).await
        }

        async fn update_status(
            &self,
            out_trade_no: &str,
            expected: TransactionStatus,
            status: TransactionStatus,
            trade_no: Option<&str>,
        ) -> Result<bool, DomainError> {
            self.inner
                .update_status(out_trade_no, expected, status, trade_no)
                .await
        }
    }

    #[tokio::test]
    async fn lost_status_race_skips_listener() {
        let inner = InMemoryTransactionRepository::new();
        inner.seed_pending("P1").await;
        inner
            .update_status("P1", TransactionStatus::Pending, TransactionStatus::Paid, Some("T0"))
            .await
            .unwrap();
        let listener = Arc::new(RecordingNotifyListener::new());
        let handler = HandleNotifyHandler::new(
            Arc::new(InMemoryTransactionLock::new()),
            Arc::new(StaleReadRepository { inner }),
            listener.clone(),
            NotifyConfig::default(),
        );

        let out = handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(out.disposition, NotifyDisposition::AlreadyProcessed);
        assert_eq!(listener.paid_count(), 0);
    }

    #[tokio::test]
    async fn body_slower_than_deadline_is_cancelled() {
        let lock = Arc::new(InMemoryTransactionLock::new());
        let repo = Arc::new(InMemoryTransactionRepository::new());
        repo.seed_pending("P1").await;
        let listener =
            Arc::new(RecordingNotifyListener::new().with_delay(Duration::from_millis(500)));
        let handler = HandleNotifyHandler::new(
            lock.clone(),
            repo.clone(),
            listener.clone(),
            NotifyConfig {
                lock_ttl: Duration::from_millis(100),
                ..NotifyConfig::default()
            },
        );

        let out = handler.handle(NotifyProvider::Alipay, PAID).await;

        assert_eq!(out.disposition, NotifyDisposition::Failed);
        assert!(out.ack.is_success());
        assert_eq!(listener.paid_count(), 0);
        assert!(!lock.is_held("notify:P1").await);

        let redelivered = handler.handle(NotifyProvider::Alipay, PAID).await;
        assert_eq!(redelivered.disposition, NotifyDisposition::AlreadyProcessed);
    }

    fn wechat_paid() -> Vec<u8> {
        serde_json::json!({
            "id": "evt-1",
            "event_type": "TRANSACTION.SUCCESS",
            "resource": {
                "out_trade_no": "P1",
                "transaction_id": "420000",
                "trade_state": "SUCCESS",
                "amount": {"total": 100}
            }
        })
        .to_string()
        .into_bytes()
    }
}
