//! Provider profiles and action routing.
//!
//! A [`ProviderProfile`] captures everything that differs between providers:
//! host, API version, signature scheme, where parameters travel, header
//! names and the response envelope. Action routing is a `match` per provider
//! from [`GatewayAction`] to an [`ActionRoute`] holding the provider's action
//! name and a parameter-builder function.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::action::{
    ActionInput, DnsRecord, GatewayAction, OrderQuery, OrderRequest, RecordChange, RecordQuery,
    RecordRef, RefundQuery, RefundRequest,
};
use super::errors::GatewayError;
use crate::domain::foundation::{OrderNo, RequestId, Timestamp};
use crate::domain::signing::{
    DerivedKeySigner, DirectHmacSigner, SignedRequest, Signer, SigningContext, SigningProfile,
};

/// Provider parameters, keyed by the provider's own field names.
pub type ProviderParams = Map<String, Value>;

/// Builds provider parameters from a typed action input and the call's
/// generated order number.
pub type BuildParams = fn(&ActionInput, &OrderNo) -> Result<ProviderParams, GatewayError>;

/// Supported outbound providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    AliyunDns,
    TencentDns,
    Payment,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::AliyunDns => "aliyun_dns",
            ProviderKind::TencentDns => "tencent_dns",
            ProviderKind::Payment => "payment",
        }
    }

    /// Route for `action`, or `None` if this provider does not support it.
    pub fn route(&self, action: GatewayAction) -> Option<ActionRoute> {
        let (provider_action, build_params): (&'static str, BuildParams) = match (self, action) {
            (ProviderKind::AliyunDns, GatewayAction::QueryRecords) => {
                ("DescribeDomainRecords", aliyun::query_records)
            }
            (ProviderKind::AliyunDns, GatewayAction::CreateRecord) => {
                ("AddDomainRecord", aliyun::create_record)
            }
            (ProviderKind::AliyunDns, GatewayAction::ModifyRecord) => {
                ("UpdateDomainRecord", aliyun::modify_record)
            }
            (ProviderKind::AliyunDns, GatewayAction::DeleteRecord) => {
                ("DeleteDomainRecord", aliyun::delete_record)
            }
            (ProviderKind::TencentDns, GatewayAction::QueryRecords) => {
                ("DescribeRecordList", tencent::query_records)
            }
            (ProviderKind::TencentDns, GatewayAction::CreateRecord) => {
                ("CreateRecord", tencent::create_record)
            }
            (ProviderKind::TencentDns, GatewayAction::ModifyRecord) => {
                ("ModifyRecord", tencent::modify_record)
            }
            (ProviderKind::TencentDns, GatewayAction::DeleteRecord) => {
                ("DeleteRecord", tencent::delete_record)
            }
            (ProviderKind::Payment, GatewayAction::CreateOrder) => {
                ("trade.create", payment::create_order)
            }
            (ProviderKind::Payment, GatewayAction::Refund) => ("trade.refund", payment::refund),
            (ProviderKind::Payment, GatewayAction::QueryOrder) => {
                ("trade.query", payment::query_order)
            }
            (ProviderKind::Payment, GatewayAction::QueryRefund) => {
                ("trade.refund.query", payment::query_refund)
            }
            (
                ProviderKind::AliyunDns | ProviderKind::TencentDns,
                GatewayAction::CreateOrder
                | GatewayAction::Refund
                | GatewayAction::QueryOrder
                | GatewayAction::QueryRefund,
            )
            | (
                ProviderKind::Payment,
                GatewayAction::QueryRecords
                | GatewayAction::CreateRecord
                | GatewayAction::ModifyRecord
                | GatewayAction::DeleteRecord,
            ) => return None,
        };

        Some(ActionRoute {
            action,
            provider_action,
            build_params,
        })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aliyun_dns" => Ok(ProviderKind::AliyunDns),
            "tencent_dns" => Ok(ProviderKind::TencentDns),
            "payment" => Ok(ProviderKind::Payment),
            other => Err(GatewayError::Configuration(format!("unknown provider '{}'", other))),
        }
    }
}

/// One provider's mapping of a gateway action.
#[derive(Clone, Copy)]
pub struct ActionRoute {
    pub action: GatewayAction,
    /// Action name as the provider's API spells it.
    pub provider_action: &'static str,
    pub build_params: BuildParams,
}

impl fmt::Debug for ActionRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRoute")
            .field("action", &self.action)
            .field("provider_action", &self.provider_action)
            .finish_non_exhaustive()
    }
}

/// How a provider signs requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// `ACS3-HMAC-SHA256`.
    Acs3,
    /// `TC3-HMAC-SHA256` with the date/service key chain.
    Tc3,
    /// Single-pass `HMAC-SHA256`.
    HmacSha256,
}

impl SignatureScheme {
    pub fn signer(&self) -> Box<dyn Signer> {
        match self {
            SignatureScheme::Acs3 => Box::new(DirectHmacSigner::acs3()),
            SignatureScheme::Tc3 => Box::new(DerivedKeySigner::tc3()),
            SignatureScheme::HmacSha256 => Box::new(DirectHmacSigner::new("HMAC-SHA256")),
        }
    }
}

/// Where action parameters travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPlacement {
    /// RPC style: every parameter is a query string entry, empty body.
    Query,
    /// JSON object body.
    JsonBody,
}

/// Response envelope layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStyle {
    /// `{Code, Message, RequestId}` on error, bare payload on success.
    Aliyun,
    /// `{Response: {Error: {Code, Message}, RequestId}}`.
    Tencent,
    /// `{code, message, data}`.
    Payment,
}

/// Format of the timestamp header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    Iso8601,
    UnixSecs,
}

/// Provider-specific header names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderHeaders {
    pub action: &'static str,
    pub timestamp: &'static str,
    pub timestamp_format: TimestampFormat,
    pub version: &'static str,
    pub nonce: Option<&'static str>,
    pub content_hash: Option<&'static str>,
    pub region: Option<&'static str>,
}

/// Everything needed to build a signed request for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub kind: ProviderKind,
    pub host: String,
    pub canonical_uri: String,
    pub api_version: String,
    /// Service name for derived-key signing.
    pub service: Option<String>,
    pub region: Option<String>,
    pub scheme: SignatureScheme,
    pub placement: ParamPlacement,
    pub envelope: EnvelopeStyle,
    pub headers: ProviderHeaders,
    pub signing: SigningProfile,
}

impl ProviderProfile {
    /// Alibaba Cloud DNS (`alidns`), RPC style with ACS3 signatures.
    pub fn aliyun_dns() -> Self {
        Self {
            kind: ProviderKind::AliyunDns,
            host: "alidns.aliyuncs.com".to_string(),
            canonical_uri: "/".to_string(),
            api_version: "2015-01-09".to_string(),
            service: None,
            region: None,
            scheme: SignatureScheme::Acs3,
            placement: ParamPlacement::Query,
            envelope: EnvelopeStyle::Aliyun,
            headers: ProviderHeaders {
                action: "x-acs-action",
                timestamp: "x-acs-date",
                timestamp_format: TimestampFormat::Iso8601,
                version: "x-acs-version",
                nonce: Some("x-acs-signature-nonce"),
                content_hash: Some("x-acs-content-sha256"),
                region: None,
            },
            signing: SigningProfile::named(["host"]).with_prefix("x-acs-"),
        }
    }

    /// Tencent Cloud DNSPod, JSON body with TC3 signatures.
    pub fn tencent_dns() -> Self {
        Self {
            kind: ProviderKind::TencentDns,
            host: "dnspod.tencentcloudapi.com".to_string(),
            canonical_uri: "/".to_string(),
            api_version: "2021-03-23".to_string(),
            service: Some("dnspod".to_string()),
            region: None,
            scheme: SignatureScheme::Tc3,
            placement: ParamPlacement::JsonBody,
            envelope: EnvelopeStyle::Tencent,
            headers: ProviderHeaders {
                action: "x-tc-action",
                timestamp: "x-tc-timestamp",
                timestamp_format: TimestampFormat::UnixSecs,
                version: "x-tc-version",
                nonce: Some("x-tc-nonce"),
                content_hash: None,
                region: Some("x-tc-region"),
            },
            signing: SigningProfile::named(["content-type", "host"]),
        }
    }

    /// Payment gateway at `host`, JSON body with single-pass HMAC.
    pub fn payment(host: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Payment,
            host: host.into(),
            canonical_uri: "/gateway".to_string(),
            api_version: "1.0".to_string(),
            service: None,
            region: None,
            scheme: SignatureScheme::HmacSha256,
            placement: ParamPlacement::JsonBody,
            envelope: EnvelopeStyle::Payment,
            headers: ProviderHeaders {
                action: "x-pay-action",
                timestamp: "x-pay-timestamp",
                timestamp_format: TimestampFormat::UnixSecs,
                version: "x-pay-version",
                nonce: Some("x-pay-nonce"),
                content_hash: Some("x-pay-content-sha256"),
                region: None,
            },
            signing: SigningProfile::named(["content-type", "host"]).with_prefix("x-pay-"),
        }
    }

    /// Default profile for `kind`. The payment host is empty until configured.
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::AliyunDns => Self::aliyun_dns(),
            ProviderKind::TencentDns => Self::tencent_dns(),
            ProviderKind::Payment => Self::payment(""),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_canonical_uri(mut self, uri: impl Into<String>) -> Self {
        self.canonical_uri = uri.into();
        self
    }

    pub fn method(&self) -> Method {
        match self.placement {
            ParamPlacement::Query => Method::GET,
            ParamPlacement::JsonBody => Method::POST,
        }
    }

    pub fn signing_context(&self, timestamp: Timestamp) -> SigningContext {
        let context = SigningContext::new(timestamp);
        match &self.service {
            Some(service) => context.with_service(service.clone()),
            None => context,
        }
    }

    /// Builds the unsigned request for one call.
    ///
    /// # Errors
    ///
    /// `Configuration` if the profile has no host; `InvalidParams` if the
    /// parameters cannot be serialized.
    pub fn build_request(
        &self,
        provider_action: &str,
        params: &ProviderParams,
        request_id: RequestId,
        timestamp: Timestamp,
    ) -> Result<SignedRequest, GatewayError> {
        if self.host.trim().is_empty() {
            return Err(GatewayError::Configuration(format!(
                "provider '{}' has no host configured",
                self.kind
            )));
        }

        let mut request =
            SignedRequest::new(self.method(), self.host.clone(), self.canonical_uri.clone(), timestamp);

        match self.placement {
            ParamPlacement::Query => {
                for (key, value) in params {
                    if let Some(value) = query_value(value) {
                        request = request.with_query(key.clone(), value);
                    }
                }
            }
            ParamPlacement::JsonBody => {
                let body = serde_json::to_vec(params)
                    .map_err(|e| GatewayError::InvalidParams(e.to_string()))?;
                request = request
                    .with_header("content-type", "application/json; charset=utf-8")
                    .with_body(body);
            }
        }

        let timestamp_value = match self.headers.timestamp_format {
            TimestampFormat::Iso8601 => timestamp.iso8601(),
            TimestampFormat::UnixSecs => timestamp.as_unix_secs().to_string(),
        };
        request = request
            .with_header(self.headers.action, provider_action)
            .with_header(self.headers.timestamp, timestamp_value)
            .with_header(self.headers.version, self.api_version.clone());

        if let Some(name) = self.headers.nonce {
            request = request.with_header(name, request_id.to_string());
        }
        if let (Some(name), Some(region)) = (self.headers.region, self.region.as_ref()) {
            request = request.with_header(name, region.clone());
        }
        if let Some(name) = self.headers.content_hash {
            let hash = request.body_hash().to_string();
            request = request.with_header(name, hash);
        }

        Ok(request)
    }
}

/// Query string rendering of a parameter; `null` is omitted.
fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn mismatch(expected: GatewayAction, input: &ActionInput) -> GatewayError {
    GatewayError::InvalidParams(format!(
        "expected {} input, got {}",
        expected,
        input.action()
    ))
}

fn insert_opt<T: Into<Value>>(params: &mut ProviderParams, key: &str, value: Option<T>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value.into());
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), GatewayError> {
    if value.trim().is_empty() {
        return Err(GatewayError::InvalidParams(format!("{} is required", field)));
    }
    Ok(())
}

fn check_record(record: &DnsRecord) -> Result<(), GatewayError> {
    require_non_empty("domain", &record.domain)?;
    require_non_empty("subdomain", &record.subdomain)?;
    require_non_empty("record_type", &record.record_type)?;
    require_non_empty("value", &record.value)
}

mod aliyun {
    use super::*;

    fn record_params(params: &mut ProviderParams, record: &DnsRecord) {
        params.insert("RR".to_string(), json!(record.subdomain));
        params.insert("Type".to_string(), json!(record.record_type));
        params.insert("Value".to_string(), json!(record.value));
        insert_opt(params, "TTL", record.ttl);
        insert_opt(params, "Line", record.line.clone());
    }

    pub(super) fn query_records(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::QueryRecords(RecordQuery {
            domain,
            subdomain,
            record_type,
        }) = input
        else {
            return Err(mismatch(GatewayAction::QueryRecords, input));
        };
        require_non_empty("domain", domain)?;

        let mut params = ProviderParams::new();
        params.insert("DomainName".to_string(), json!(domain));
        insert_opt(&mut params, "RRKeyWord", subdomain.clone());
        insert_opt(&mut params, "Type", record_type.clone());
        Ok(params)
    }

    pub(super) fn create_record(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::CreateRecord(record) = input else {
            return Err(mismatch(GatewayAction::CreateRecord, input));
        };
        check_record(record)?;

        let mut params = ProviderParams::new();
        params.insert("DomainName".to_string(), json!(record.domain));
        record_params(&mut params, record);
        Ok(params)
    }

    pub(super) fn modify_record(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::ModifyRecord(RecordChange { record_id, record }) = input else {
            return Err(mismatch(GatewayAction::ModifyRecord, input));
        };
        require_non_empty("record_id", record_id)?;
        check_record(record)?;

        let mut params = ProviderParams::new();
        params.insert("RecordId".to_string(), json!(record_id));
        record_params(&mut params, record);
        Ok(params)
    }

    pub(super) fn delete_record(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::DeleteRecord(RecordRef { record_id, .. }) = input else {
            return Err(mismatch(GatewayAction::DeleteRecord, input));
        };
        require_non_empty("record_id", record_id)?;

        let mut params = ProviderParams::new();
        params.insert("RecordId".to_string(), json!(record_id));
        Ok(params)
    }
}

mod tencent {
    use super::*;

    /// DNSPod's default resolution line.
    const DEFAULT_LINE: &str = "默认";

    fn numeric_record_id(record_id: &str) -> Result<u64, GatewayError> {
        record_id.trim().parse().map_err(|_| {
            GatewayError::InvalidParams(format!("record_id '{}' is not numeric", record_id))
        })
    }

    fn record_params(params: &mut ProviderParams, record: &DnsRecord) {
        params.insert("Domain".to_string(), json!(record.domain));
        params.insert("SubDomain".to_string(), json!(record.subdomain));
        params.insert("RecordType".to_string(), json!(record.record_type));
        params.insert(
            "RecordLine".to_string(),
            json!(record.line.as_deref().unwrap_or(DEFAULT_LINE)),
        );
        params.insert("Value".to_string(), json!(record.value));
        insert_opt(params, "TTL", record.ttl);
    }

    pub(super) fn query_records(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::QueryRecords(RecordQuery {
            domain,
            subdomain,
            record_type,
        }) = input
        else {
            return Err(mismatch(GatewayAction::QueryRecords, input));
        };
        require_non_empty("domain", domain)?;

        let mut params = ProviderParams::new();
        params.insert("Domain".to_string(), json!(domain));
        insert_opt(&mut params, "Subdomain", subdomain.clone());
        insert_opt(&mut params, "RecordType", record_type.clone());
        Ok(params)
    }

    pub(super) fn create_record(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::CreateRecord(record) = input else {
            return Err(mismatch(GatewayAction::CreateRecord, input));
        };
        check_record(record)?;

        let mut params = ProviderParams::new();
        record_params(&mut params, record);
        Ok(params)
    }

    pub(super) fn modify_record(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::ModifyRecord(RecordChange { record_id, record }) = input else {
            return Err(mismatch(GatewayAction::ModifyRecord, input));
        };
        check_record(record)?;

        let mut params = ProviderParams::new();
        record_params(&mut params, record);
        params.insert("RecordId".to_string(), json!(numeric_record_id(record_id)?));
        Ok(params)
    }

    pub(super) fn delete_record(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::DeleteRecord(RecordRef { domain, record_id }) = input else {
            return Err(mismatch(GatewayAction::DeleteRecord, input));
        };
        require_non_empty("domain", domain)?;

        let mut params = ProviderParams::new();
        params.insert("Domain".to_string(), json!(domain));
        params.insert("RecordId".to_string(), json!(numeric_record_id(record_id)?));
        Ok(params)
    }
}

mod payment {
    use super::*;

    fn positive(field: &str, amount: i64) -> Result<(), GatewayError> {
        if amount <= 0 {
            return Err(GatewayError::InvalidParams(format!(
                "{} must be positive",
                field
            )));
        }
        Ok(())
    }

    pub(super) fn create_order(
        input: &ActionInput,
        order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::CreateOrder(OrderRequest {
            subject,
            amount,
            currency,
            notify_url,
        }) = input
        else {
            return Err(mismatch(GatewayAction::CreateOrder, input));
        };
        require_non_empty("subject", subject)?;
        require_non_empty("currency", currency)?;
        positive("amount", *amount)?;

        let mut params = ProviderParams::new();
        params.insert("out_trade_no".to_string(), json!(order_no.as_str()));
        params.insert("subject".to_string(), json!(subject));
        params.insert("total_amount".to_string(), json!(amount));
        params.insert("currency".to_string(), json!(currency));
        insert_opt(&mut params, "notify_url", notify_url.clone());
        Ok(params)
    }

    pub(super) fn refund(
        input: &ActionInput,
        order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::Refund(RefundRequest {
            out_trade_no,
            amount,
            total_amount,
            reason,
        }) = input
        else {
            return Err(mismatch(GatewayAction::Refund, input));
        };
        require_non_empty("out_trade_no", out_trade_no)?;
        positive("amount", *amount)?;
        if amount > total_amount {
            return Err(GatewayError::InvalidParams(
                "refund amount exceeds order total".to_string(),
            ));
        }

        let mut params = ProviderParams::new();
        params.insert("out_trade_no".to_string(), json!(out_trade_no));
        params.insert("out_refund_no".to_string(), json!(order_no.as_str()));
        params.insert("refund_amount".to_string(), json!(amount));
        params.insert("total_amount".to_string(), json!(total_amount));
        insert_opt(&mut params, "reason", reason.clone());
        Ok(params)
    }

    pub(super) fn query_order(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::QueryOrder(OrderQuery { out_trade_no }) = input else {
            return Err(mismatch(GatewayAction::QueryOrder, input));
        };
        require_non_empty("out_trade_no", out_trade_no)?;

        let mut params = ProviderParams::new();
        params.insert("out_trade_no".to_string(), json!(out_trade_no));
        Ok(params)
    }

    pub(super) fn query_refund(
        input: &ActionInput,
        _order_no: &OrderNo,
    ) -> Result<ProviderParams, GatewayError> {
        let ActionInput::QueryRefund(RefundQuery {
            out_trade_no,
            out_refund_no,
        }) = input
        else {
            return Err(mismatch(GatewayAction::QueryRefund, input));
        };
        require_non_empty("out_refund_no", out_refund_no)?;

        let mut params = ProviderParams::new();
        params.insert("out_trade_no".to_string(), json!(out_trade_no));
        params.insert("out_refund_no".to_string(), json!(out_refund_no));
        Ok(params)
    }
}
