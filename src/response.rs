//! Gateway responses and their outcome predicates

use crate::request::Operation;
use serde_json::{Map, Value};

/// Reserved key under which the HTTP status is merged into the raw result
pub const HTTP_STATUS_KEY: &str = "httpStatus";

/// Key holding the gateway's application-level result code
pub const CODE_KEY: &str = "rsCode";

/// Decoded response body merged with the HTTP status
pub type RawResult = Map<String, Value>;

/// Response to a single ticket operation
#[derive(Debug, Clone, PartialEq)]
pub struct TicketResponse {
    operation: Operation,
    data: RawResult,
}

impl TicketResponse {
    /// Wrap a raw result; `httpStatus` should already be present
    pub fn new(operation: Operation, data: RawResult) -> Self {
        Self { operation, data }
    }

    /// Wrap a decoded body and record `http_status` under the reserved key
    pub fn from_parts(operation: Operation, mut body: RawResult, http_status: u16) -> Self {
        body.insert(HTTP_STATUS_KEY.to_string(), Value::from(http_status));
        Self::new(operation, body)
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The merged raw result
    pub fn data(&self) -> &RawResult {
        &self.data
    }

    pub fn into_data(self) -> RawResult {
        self.data
    }

    /// HTTP status of the exchange, 0 if absent
    pub fn http_status(&self) -> u16 {
        self.data
            .get(HTTP_STATUS_KEY)
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok())
            .unwrap_or(0)
    }

    /// Application result code; numeric strings are accepted
    pub fn code(&self) -> Option<i64> {
        match self.data.get(CODE_KEY)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }

    /// The nested `result` object, if the gateway sent one
    pub fn result(&self) -> Option<&Map<String, Value>> {
        self.data.get("result").and_then(Value::as_object)
    }

    /// Ticket id issued by a create call
    pub fn ticket_id(&self) -> Option<&str> {
        self.result()?.get("ticket_id").and_then(Value::as_str)
    }

    /// Where the customer must be sent to complete the purchase
    pub fn payment_uri(&self) -> Option<&str> {
        self.result()?.get("payment_uri").and_then(Value::as_str)
    }

    pub fn is_successful(&self) -> bool {
        self.operation.is_successful(self.http_status(), self.code())
    }

    /// Only a status lookup can report a cancelled ticket
    pub fn is_cancelled(&self) -> bool {
        self.operation.is_cancelled(self.http_status(), self.code())
    }

    /// A successful create that carries a payment URI
    pub fn is_redirect(&self) -> bool {
        self.operation == Operation::Create && self.is_successful() && self.payment_uri().is_some()
    }

    pub fn redirect_url(&self) -> Option<&str> {
        if self.is_redirect() {
            self.payment_uri()
        } else {
            None
        }
    }
}
