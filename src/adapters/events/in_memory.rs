//! In-memory event sinks for testing.
//!
//! Provides deterministic capture of gateway events and listener calls so
//! tests can assert on exactly-once behavior.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::notify::NotifyData;
use crate::ports::{GatewayEventPublisher, GatewayRequestCreated, NotifyListener};

/// Captures published gateway events.
///
/// # Example
///
/// ```ignore
/// let events = Arc::new(InMemoryGatewayEvents::new());
/// gateway.query_order(ProviderKind::Payment, query).await?;
/// assert_eq!(events.event_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGatewayEvents {
    published: Mutex<Vec<GatewayRequestCreated>>,
    fail: bool,
}

impl InMemoryGatewayEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose publish always fails, for error-path tests.
    pub fn failing() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    // === Test Helpers ===

    pub fn published(&self) -> Vec<GatewayRequestCreated> {
        self.published
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.published.lock().map(|events| events.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GatewayEventPublisher for InMemoryGatewayEvents {
    async fn request_created(&self, event: GatewayRequestCreated) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "event sink unavailable",
            ));
        }
        self.published
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Lock poisoned"))?
            .push(event);
        Ok(())
    }
}

/// Counts listener invocations, optionally sleeping or failing inside the
/// handler body so tests can observe locking and fault handling.
#[derive(Debug, Default)]
pub struct RecordingNotifyListener {
    paid: AtomicUsize,
    refunded: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    fail: bool,
    panic: bool,
}

impl RecordingNotifyListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` inside each callback.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every callback returns an error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every callback panics.
    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    pub fn paid_count(&self) -> usize {
        self.paid.load(Ordering::SeqCst)
    }

    pub fn refunded_count(&self) -> usize {
        self.refunded.load(Ordering::SeqCst)
    }

    /// Highest number of callbacks observed running at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, counter: &AtomicUsize) -> Result<(), DomainError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic {
            panic!("listener panicked");
        }
        if self.fail {
            return Err(DomainError::new(ErrorCode::InternalError, "listener failed"));
        }
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl NotifyListener for RecordingNotifyListener {
    async fn on_paid(&self, _notify: &NotifyData) -> Result<(), DomainError> {
        self.record(&self.paid).await
    }

    async fn on_refunded(&self, _notify: &NotifyData) -> Result<(), DomainError> {
        self.record(&self.refunded).await
    }
}
