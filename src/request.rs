//! Ticket operations and the requests that carry them

use crate::{AzkiError, Result};
use http::Method;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Smallest provider id the gateway accepts
pub const PROVIDER_ID_MIN: u32 = 10_000_000;
/// Largest provider id the gateway accepts
pub const PROVIDER_ID_MAX: u32 = 999_999_999;

/// Gateway paths for each operation
pub mod paths {
    pub const PURCHASE: &str = "/payment/purchase";
    pub const VERIFY: &str = "/payment/verify";
    pub const REVERSE: &str = "/payment/reverse";
    pub const CANCEL: &str = "/payment/cancel";
    pub const STATUS: &str = "/payment/status";
}

/// Source of provider ids attached to create and reverse payloads
pub trait ProviderIdSource: Send + Sync {
    /// Next provider id, within [`PROVIDER_ID_MIN`]..=[`PROVIDER_ID_MAX`]
    fn next_provider_id(&self) -> u32;
}

/// Draws provider ids from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngProviderId;

impl ProviderIdSource for ThreadRngProviderId {
    fn next_provider_id(&self) -> u32 {
        rand::thread_rng().gen_range(PROVIDER_ID_MIN..=PROVIDER_ID_MAX)
    }
}

/// Always returns the same provider id
#[derive(Debug, Clone, Copy)]
pub struct FixedProviderId(pub u32);

impl ProviderIdSource for FixedProviderId {
    fn next_provider_id(&self) -> u32 {
        self.0
    }
}

/// A purchased item listed on a create-ticket request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub count: u32,
    /// Unit price in Rials
    pub amount: u64,
    pub url: String,
}

impl Item {
    pub fn new(name: impl Into<String>, count: u32, amount: u64, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count,
            amount,
            url: url.into(),
        }
    }
}

/// Merchant-supplied fields; each operation reads the subset it needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    /// Amount in Rials
    pub amount: Option<u64>,
    pub redirect_url: Option<String>,
    pub fallback_url: Option<String>,
    pub mobile_number: Option<String>,
    pub items: Vec<Item>,
    pub ticket_id: Option<String>,
}

impl RequestParameters {
    fn require_ticket_id(&self) -> Result<&str> {
        require(self.ticket_id.as_deref(), "ticketId")
    }
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| AzkiError::missing_parameter(name))
}

/// Everything a payload builder may read besides the request parameters
pub struct PayloadContext<'a> {
    pub merchant_id: &'a str,
    pub provider_ids: &'a dyn ProviderIdSource,
}

#[derive(Serialize)]
struct CreatePayload<'a> {
    amount: u64,
    redirect_uri: &'a str,
    fallback_uri: &'a str,
    provider_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<&'a str>,
    merchant_id: &'a str,
    items: &'a [Item],
}

#[derive(Serialize)]
struct TicketPayload<'a> {
    ticket_id: &'a str,
}

#[derive(Serialize)]
struct ReversePayload<'a> {
    ticket_id: &'a str,
    provider_id: u32,
}

fn build_create(params: &RequestParameters, ctx: &PayloadContext<'_>) -> Result<Value> {
    let payload = CreatePayload {
        amount: require(params.amount, "amount")?,
        redirect_uri: require(params.redirect_url.as_deref(), "returnUrl")?,
        fallback_uri: require(params.fallback_url.as_deref(), "fallBackUrl")?,
        provider_id: ctx.provider_ids.next_provider_id(),
        mobile_number: params.mobile_number.as_deref(),
        merchant_id: ctx.merchant_id,
        items: &params.items,
    };
    Ok(serde_json::to_value(payload)?)
}

fn build_ticket(params: &RequestParameters, _ctx: &PayloadContext<'_>) -> Result<Value> {
    let payload = TicketPayload {
        ticket_id: params.require_ticket_id()?,
    };
    Ok(serde_json::to_value(payload)?)
}

fn build_reverse(params: &RequestParameters, ctx: &PayloadContext<'_>) -> Result<Value> {
    let payload = ReversePayload {
        ticket_id: params.require_ticket_id()?,
        provider_id: ctx.provider_ids.next_provider_id(),
    };
    Ok(serde_json::to_value(payload)?)
}

fn code_is_zero(status: u16, code: Option<i64>) -> bool {
    status == 200 && code == Some(0)
}

fn code_is_minus_one(status: u16, code: Option<i64>) -> bool {
    status == 200 && code == Some(-1)
}

fn never(_status: u16, _code: Option<i64>) -> bool {
    false
}

fn status_cancelled(status: u16, code: Option<i64>) -> bool {
    status == 200 && code != Some(0)
}

type PayloadBuilder = fn(&RequestParameters, &PayloadContext<'_>) -> Result<Value>;
type Predicate = fn(u16, Option<i64>) -> bool;

/// One row of the operation dispatch table
struct OperationSpec {
    name: &'static str,
    method: Method,
    path: &'static str,
    build: PayloadBuilder,
    successful: Predicate,
    cancelled: Predicate,
}

/// Dispatch table, indexed by `Operation as usize`
static OPERATIONS: [OperationSpec; 5] = [
    OperationSpec {
        name: "create",
        method: Method::POST,
        path: paths::PURCHASE,
        build: build_create,
        successful: code_is_zero,
        cancelled: never,
    },
    OperationSpec {
        name: "verify",
        method: Method::POST,
        path: paths::VERIFY,
        build: build_ticket,
        successful: code_is_zero,
        cancelled: never,
    },
    OperationSpec {
        name: "reverse",
        method: Method::POST,
        path: paths::REVERSE,
        build: build_reverse,
        successful: code_is_zero,
        cancelled: never,
    },
    OperationSpec {
        name: "cancel",
        method: Method::POST,
        path: paths::CANCEL,
        build: build_ticket,
        successful: code_is_minus_one,
        cancelled: never,
    },
    OperationSpec {
        name: "status",
        method: Method::POST,
        path: paths::STATUS,
        build: build_ticket,
        successful: code_is_zero,
        cancelled: status_cancelled,
    },
];

/// Ticket operations supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create = 0,
    Verify = 1,
    Reverse = 2,
    Cancel = 3,
    Status = 4,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Verify,
        Operation::Reverse,
        Operation::Cancel,
        Operation::Status,
    ];

    fn spec(self) -> &'static OperationSpec {
        &OPERATIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn http_method(self) -> Method {
        self.spec().method.clone()
    }

    /// Default path suffix on the gateway host
    pub fn path(self) -> &'static str {
        self.spec().path
    }

    /// Whether the gateway reported the operation as completed
    pub fn is_successful(self, http_status: u16, code: Option<i64>) -> bool {
        (self.spec().successful)(http_status, code)
    }

    /// Whether a status lookup found the ticket cancelled
    pub fn is_cancelled(self, http_status: u16, code: Option<i64>) -> bool {
        (self.spec().cancelled)(http_status, code)
    }

    fn build_payload(self, params: &RequestParameters, ctx: &PayloadContext<'_>) -> Result<Value> {
        (self.spec().build)(params, ctx)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fail when test mode is requested; the gateway has no sandbox
pub fn ensure_live_mode(test_mode: bool) -> Result<()> {
    if test_mode {
        return Err(AzkiError::config(
            "AzkiVam payment gateway does not support test mode",
        ));
    }
    Ok(())
}

/// A single ticket operation with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRequest {
    operation: Operation,
    parameters: RequestParameters,
    test_mode: bool,
    endpoint: Option<String>,
}

impl TicketRequest {
    /// Create an empty request for `operation`
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            parameters: RequestParameters::default(),
            test_mode: false,
            endpoint: None,
        }
    }

    /// Create-ticket request for `amount` Rials
    pub fn create(
        amount: u64,
        redirect_url: impl Into<String>,
        fallback_url: impl Into<String>,
    ) -> Self {
        Self::new(Operation::Create)
            .with_amount(amount)
            .with_redirect_url(redirect_url)
            .with_fallback_url(fallback_url)
    }

    pub fn verify(ticket_id: impl Into<String>) -> Self {
        Self::new(Operation::Verify).with_ticket_id(ticket_id)
    }

    pub fn reverse(ticket_id: impl Into<String>) -> Self {
        Self::new(Operation::Reverse).with_ticket_id(ticket_id)
    }

    pub fn cancel(ticket_id: impl Into<String>) -> Self {
        Self::new(Operation::Cancel).with_ticket_id(ticket_id)
    }

    pub fn status(ticket_id: impl Into<String>) -> Self {
        Self::new(Operation::Status).with_ticket_id(ticket_id)
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.parameters.amount = Some(amount);
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.parameters.redirect_url = Some(url.into());
        self
    }

    pub fn with_fallback_url(mut self, url: impl Into<String>) -> Self {
        self.parameters.fallback_url = Some(url.into());
        self
    }

    pub fn with_mobile_number(mut self, mobile_number: impl Into<String>) -> Self {
        self.parameters.mobile_number = Some(mobile_number.into());
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.parameters.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.parameters.items.extend(items);
        self
    }

    pub fn with_ticket_id(mut self, ticket_id: impl Into<String>) -> Self {
        self.parameters.ticket_id = Some(ticket_id.into());
        self
    }

    /// Request the sandbox; sending such a request always fails
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Override the path suffix, e.g. for cancel and status lookups
    pub fn with_endpoint(mut self, path: impl Into<String>) -> Self {
        self.endpoint = Some(path.into());
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn parameters(&self) -> &RequestParameters {
        &self.parameters
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn http_method(&self) -> Method {
        self.operation.http_method()
    }

    /// Path suffix this request is sent to and signed with
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.operation.path())
    }

    /// Full URL on `base_url`; fails in test mode
    pub fn target_uri(&self, base_url: &str) -> Result<String> {
        ensure_live_mode(self.test_mode)?;
        Ok(format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            self.endpoint()
        ))
    }

    /// Build the JSON body, validating required fields
    ///
    /// Create and reverse draw a fresh provider id on every call.
    pub fn payload(&self, ctx: &PayloadContext<'_>) -> Result<Value> {
        self.operation.build_payload(&self.parameters, ctx)
    }
}
