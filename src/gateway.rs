//! Gateway client: signs ticket requests and sends them to AzkiVam

use crate::config::GatewayConfig;
use crate::request::{
    ensure_live_mode, PayloadContext, ProviderIdSource, ThreadRngProviderId, TicketRequest,
};
use crate::response::{RawResult, TicketResponse};
use crate::signature::{Clock, Signer, SystemClock};
use crate::transport::{HttpTransport, ReqwestTransport, TransportRequest};
use crate::{AzkiError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the AzkiVam ticket API
///
/// Each call to [`send`](Self::send) performs exactly one HTTP exchange.
#[derive(Clone)]
pub struct AzkiGateway {
    config: GatewayConfig,
    signer: Signer,
    transport: Arc<dyn HttpTransport>,
    provider_ids: Arc<dyn ProviderIdSource>,
}

impl std::fmt::Debug for AzkiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzkiGateway")
            .field("config", &self.config)
            .field("transport", &"<transport>")
            .finish()
    }
}

impl AzkiGateway {
    /// Create a gateway client using `reqwest`, the wall clock and a random
    /// provider id source
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(SystemClock),
            Arc::new(ThreadRngProviderId),
        ))
    }

    /// Create a gateway client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    /// Assemble a client from explicit collaborators
    ///
    /// The config is not validated here; a malformed API key surfaces as a
    /// configuration error on the first send.
    pub fn with_parts(
        config: GatewayConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        provider_ids: Arc<dyn ProviderIdSource>,
    ) -> Self {
        let signer = Signer::new(config.credentials.api_key.clone(), clock);
        Self {
            config,
            signer,
            transport,
            provider_ids,
        }
    }

    /// Replace the HTTP transport
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the clock used for signatures
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.signer = Signer::new(self.config.credentials.api_key.clone(), clock);
        self
    }

    /// Replace the provider id source
    pub fn with_provider_ids(mut self, provider_ids: Arc<dyn ProviderIdSource>) -> Self {
        self.provider_ids = provider_ids;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Base URL requests are sent to; fails when test mode is configured
    pub fn endpoint(&self) -> Result<&str> {
        ensure_live_mode(self.config.test_mode)?;
        Ok(&self.config.base_url)
    }

    /// Sign and send `request`, returning the gateway's response
    ///
    /// Configuration and validation errors are raised before any network
    /// I/O. Every failure after that is a communication error. A rejected
    /// ticket is still `Ok`; check [`TicketResponse::is_successful`].
    pub async fn send(&self, request: &TicketRequest) -> Result<TicketResponse> {
        let operation = request.operation();
        let url = request.target_uri(self.endpoint()?)?;

        let payload = request.payload(&PayloadContext {
            merchant_id: &self.config.credentials.merchant_id,
            provider_ids: self.provider_ids.as_ref(),
        })?;

        let method = request.http_method();
        let signature = self.signer.sign(request.endpoint(), method.as_str())?;

        debug!(
            operation = %operation,
            url = %url,
            provider_id = ?payload.get("provider_id"),
            "Sending ticket request"
        );

        let body = serde_json::to_string(&payload)?;
        let transport_request = TransportRequest {
            method,
            url,
            headers: vec![
                ("Accept".to_string(), "*/*".to_string()),
                ("Content-type".to_string(), "application/json".to_string()),
                ("signature".to_string(), signature),
                (
                    "merchantId".to_string(),
                    self.config.credentials.merchant_id.clone(),
                ),
            ],
            body,
        };

        let response = match self.transport.execute(transport_request).await {
            Ok(response) => response,
            Err(err) => {
                let err = into_communication(err);
                warn!(operation = %operation, error = %err, "Ticket request failed");
                return Err(err);
            }
        };

        let data = decode_body(&response.body).inspect_err(|err| {
            warn!(operation = %operation, error = %err, "Unreadable gateway response");
        })?;
        let ticket_response = TicketResponse::from_parts(operation, data, response.status);

        info!(
            operation = %operation,
            http_status = response.status,
            code = ?ticket_response.code(),
            successful = ticket_response.is_successful(),
            "Ticket request completed"
        );

        Ok(ticket_response)
    }

    /// Create a ticket
    pub async fn create_ticket(&self, request: &TicketRequest) -> Result<TicketResponse> {
        self.send(request).await
    }

    /// Verify a ticket after the customer returns from the gateway
    pub async fn verify_ticket(&self, ticket_id: impl Into<String>) -> Result<TicketResponse> {
        self.send(&TicketRequest::verify(ticket_id)).await
    }

    /// Reverse a verified ticket
    pub async fn reverse_ticket(&self, ticket_id: impl Into<String>) -> Result<TicketResponse> {
        self.send(&TicketRequest::reverse(ticket_id)).await
    }

    /// Cancel a ticket
    pub async fn cancel_ticket(&self, ticket_id: impl Into<String>) -> Result<TicketResponse> {
        self.send(&TicketRequest::cancel(ticket_id)).await
    }

    /// Look up a ticket's status
    pub async fn ticket_status(&self, ticket_id: impl Into<String>) -> Result<TicketResponse> {
        self.send(&TicketRequest::status(ticket_id)).await
    }
}

/// Decode a response body; an empty body is an empty object
fn decode_body(body: &str) -> Result<RawResult> {
    if body.trim().is_empty() {
        return Ok(RawResult::new());
    }

    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(AzkiError::communication(
            format!("expected a JSON object, got {}", json_kind(&other)),
            None,
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn into_communication(err: AzkiError) -> AzkiError {
    match err {
        AzkiError::Communication { .. } => err,
        AzkiError::Config { message } | AzkiError::Validation { message } => {
            AzkiError::communication(message, None)
        }
    }
}
