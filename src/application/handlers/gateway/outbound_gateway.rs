//! OutboundGateway - Signs and sends provider API calls.
//!
//! Every public operation funnels into [`OutboundGateway::execute`], which
//! routes the action, signs the request for the provider's scheme, sends it
//! once and unwraps the provider's response envelope.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::domain::foundation::{OrderNo, RequestId, Timestamp};
use crate::domain::gateway::{
    unwrap_envelope, ActionInput, DnsRecord, GatewayAction, GatewayError, OrderQuery,
    OrderRequest, ProviderKind, ProviderProfile, RecordChange, RecordQuery, RecordRef,
    RefundQuery, RefundRequest,
};
use crate::domain::signing::CanonicalRequestBuilder;
use crate::ports::{
    CredentialStore, CredentialStoreError, GatewayEventPublisher, GatewayRequestCreated,
    HttpClient, HttpError, HttpRequest,
};

/// Default bound on one provider call.
pub const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(5);

/// Unwrapped result of a successful provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub request_id: RequestId,
    /// Locally generated order / request number sent with the call.
    pub order_no: OrderNo,
    pub provider: ProviderKind,
    pub action: GatewayAction,
    pub provider_action: String,
    pub status: u16,
    /// Payload with the provider envelope removed.
    pub data: Value,
    pub elapsed_ms: u64,
}

/// Dispatcher over payment and DNS providers.
pub struct OutboundGateway {
    profiles: HashMap<ProviderKind, ProviderProfile>,
    credentials: Arc<dyn CredentialStore>,
    http: Arc<dyn HttpClient>,
    events: Arc<dyn GatewayEventPublisher>,
    timeout: Duration,
    canonical: CanonicalRequestBuilder,
}

impl OutboundGateway {
    /// Creates a gateway with the built-in profile for every provider.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        http: Arc<dyn HttpClient>,
        events: Arc<dyn GatewayEventPublisher>,
    ) -> Self {
        let profiles = [
            ProviderKind::AliyunDns,
            ProviderKind::TencentDns,
            ProviderKind::Payment,
        ]
        .into_iter()
        .map(|kind| (kind, ProviderProfile::for_kind(kind)))
        .collect();

        Self {
            profiles,
            credentials,
            http,
            events,
            timeout: DEFAULT_OUTBOUND_TIMEOUT,
            canonical: CanonicalRequestBuilder::new(),
        }
    }

    /// Replaces the profile for `profile.kind`.
    pub fn with_profile(mut self, profile: ProviderProfile) -> Self {
        self.profiles.insert(profile.kind, profile);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn profile(&self, provider: ProviderKind) -> Option<&ProviderProfile> {
        self.profiles.get(&provider)
    }

    // ════════════════════════════════════════════════════════════════════
    // Actions
    // ════════════════════════════════════════════════════════════════════

    pub async fn create_order(
        &self,
        provider: ProviderKind,
        order: OrderRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::CreateOrder(order)).await
    }

    pub async fn refund(
        &self,
        provider: ProviderKind,
        refund: RefundRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::Refund(refund)).await
    }

    pub async fn query_order(
        &self,
        provider: ProviderKind,
        query: OrderQuery,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::QueryOrder(query)).await
    }

    pub async fn query_refund(
        &self,
        provider: ProviderKind,
        query: RefundQuery,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::QueryRefund(query)).await
    }

    pub async fn query_records(
        &self,
        provider: ProviderKind,
        query: RecordQuery,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::QueryRecords(query)).await
    }

    pub async fn create_record(
        &self,
        provider: ProviderKind,
        record: DnsRecord,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::CreateRecord(record)).await
    }

    pub async fn modify_record(
        &self,
        provider: ProviderKind,
        change: RecordChange,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::ModifyRecord(change)).await
    }

    pub async fn delete_record(
        &self,
        provider: ProviderKind,
        record: RecordRef,
    ) -> Result<GatewayResponse, GatewayError> {
        self.execute(provider, ActionInput::DeleteRecord(record)).await
    }

    // ════════════════════════════════════════════════════════════════════
    // Dispatch
    // ════════════════════════════════════════════════════════════════════

    /// Runs one provider call end to end. Never retries.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAction` - provider has no route for the action
    /// - `Configuration` / `Signing` - missing host or credential, raised
    ///   before any network I/O
    /// - `Timeout` / `Transport` - the call did not complete
    /// - `ProviderEnvelope` / `Http` / `InvalidResponse` - provider rejected
    ///   the call or answered with something unparseable
    pub async fn execute(
        &self,
        provider: ProviderKind,
        input: ActionInput,
    ) -> Result<GatewayResponse, GatewayError> {
        let action = input.action();

        // 1. Route before touching credentials
        let route = provider
            .route(action)
            .ok_or(GatewayError::UnsupportedAction { provider, action })?;
        let profile = self.profiles.get(&provider).ok_or_else(|| {
            GatewayError::Configuration(format!("no profile for provider '{}'", provider))
        })?;

        // 2. Fresh identifiers for this call
        let now = Timestamp::now();
        let request_id = RequestId::new();
        let order_no = OrderNo::generate_at(action.order_prefix(), now);

        // 3. Provider parameters and the unsigned request
        let params = (route.build_params)(&input, &order_no)?;
        let request =
            profile.build_request(route.provider_action, &params, request_id, now)?;

        // 4. Credential and signature
        let credential = self
            .credentials
            .provider_credential(provider)
            .await
            .map_err(|e| match e {
                CredentialStoreError::NotConfigured(_) => GatewayError::Configuration(e.to_string()),
                CredentialStoreError::Unavailable(_) => GatewayError::Transport(e.to_string()),
            })?;
        credential.ensure_usable()?;

        let canonical = self.canonical.build(&request, &profile.signing);
        let signature =
            profile
                .scheme
                .signer()
                .sign(&canonical, &credential, &profile.signing_context(now))?;

        // 5. Wire request
        let mut headers: Vec<(String, String)> = request
            .headers()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.push((
            "authorization".to_string(),
            signature.authorization(credential.secret_id()),
        ));

        let http_request = HttpRequest {
            method: request.method().clone(),
            url: request.url(),
            headers,
            body: request.body().to_vec(),
            timeout: self.timeout,
        };

        tracing::debug!(
            %request_id,
            %provider,
            provider_action = route.provider_action,
            "Sending provider request"
        );

        // 6. Send once
        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.http.send(http_request))
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(|e| match e {
                HttpError::Timeout => GatewayError::Timeout,
                HttpError::Connect(msg) | HttpError::Other(msg) => GatewayError::Transport(msg),
            })?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        // 7. Envelope
        let data = match unwrap_envelope(profile.envelope, response.status, &response.body) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    %request_id,
                    %provider,
                    provider_action = route.provider_action,
                    status = response.status,
                    error = %e,
                    "Provider call failed"
                );
                return Err(e);
            }
        };

        // 8. Observability event; a failing sink never fails the call
        let event = GatewayRequestCreated {
            request_id,
            order_no: order_no.clone(),
            provider,
            action,
            provider_action: route.provider_action.to_string(),
            status: response.status,
            elapsed_ms,
            occurred_at: Timestamp::now(),
        };
        if let Err(e) = self.events.request_created(event).await {
            tracing::warn!(%request_id, error = %e, "Failed to publish gateway event");
        }

        Ok(GatewayResponse {
            request_id,
            order_no,
            provider,
            action,
            provider_action: route.provider_action.to_string(),
            status: response.status,
            data,
            elapsed_ms,
        })
    }
}
