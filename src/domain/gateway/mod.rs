//! Outbound gateway domain: actions, provider profiles, routing and
//! response envelopes.

mod action;
mod envelope;
mod errors;
mod provider;

pub use action::{
    ActionInput, DnsRecord, GatewayAction, OrderQuery, OrderRequest, RecordChange, RecordQuery,
    RecordRef, RefundQuery, RefundRequest,
};
pub use envelope::unwrap_envelope;
pub use errors::GatewayError;
pub use provider::{
    ActionRoute, BuildParams, EnvelopeStyle, ParamPlacement, ProviderHeaders, ProviderKind,
    ProviderParams, ProviderProfile, SignatureScheme, TimestampFormat,
};
