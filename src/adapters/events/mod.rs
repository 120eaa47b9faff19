//! Event adapters.
//!
//! Adapters implement the observability and notification-reaction ports:
//!
//! - `TracingEventPublisher` - Emits gateway events as structured log lines
//! - `InMemoryGatewayEvents` - Captures gateway events for test assertions
//! - `TracingNotifyListener` - Logs settled payments and refunds
//! - `RecordingNotifyListener` - Counts listener invocations for tests

mod in_memory;
mod tracing_publisher;

pub use in_memory::{InMemoryGatewayEvents, RecordingNotifyListener};
pub use tracing_publisher::{TracingEventPublisher, TracingNotifyListener};
