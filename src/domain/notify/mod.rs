//! Payment and refund notifications.
//!
//! Provider callbacks are parsed into one [`NotifyData`] type; the handler
//! that locks, dispatches and acknowledges lives in the application layer.

mod ack;
mod alipay;
mod errors;
mod notify_data;
mod wechat;

pub use ack::NotifyAck;
pub use errors::NotifyError;
pub use notify_data::{NotifyData, NotifyProvider, PaymentState, RefundState};
