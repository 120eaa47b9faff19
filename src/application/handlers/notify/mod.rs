//! Payment and refund notification handling.

mod handle_notify;

pub use handle_notify::{HandleNotifyHandler, NotifyConfig, NotifyDisposition, NotifyOutcome};
