//! HTTP transport used to reach the gateway

use crate::{AzkiError, Result};
use async_trait::async_trait;
use http::Method;
use reqwest::Client;
use std::time::Duration;

/// An outbound HTTP exchange, fully prepared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportRequest {
    /// Value of the first header named `name`, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and full body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Performs one HTTP exchange per call
///
/// Implementations must not retry. Any failure is reported as an error;
/// non-2xx statuses are responses, not failures.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Transport backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with an optional request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| AzkiError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .body(request.body);

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_reqwest_transport_round_trip() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/payment/verify")
            .match_header("signature", "abc")
            .match_body(Matcher::Exact(r#"{"ticket_id":"t1"}"#.to_string()))
            .with_status(201)
            .with_body(r#"{"rsCode":0}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();
        let response = transport
            .execute(TransportRequest {
                method: Method::POST,
                url: format!("{}/payment/verify", server.url()),
                headers: vec![("signature".to_string(), "abc".to_string())],
                body: r#"{"ticket_id":"t1"}"#.to_string(),
            })
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(response.status, 201);
        assert_eq!(response.body, r#"{"rsCode":0}"#);
    }

    #[tokio::test]
    async fn test_transport_with_existing_client() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/payment/status")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let transport = ReqwestTransport::with_client(Client::new());
        let response = transport
            .execute(TransportRequest {
                method: Method::POST,
                url: format!("{}/payment/status", server.url()),
                headers: Vec::new(),
                body: "{}".to_string(),
            })
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_reqwest_transport_connection_error() {
        // Port 9 (discard) on localhost is not expected to accept connections
        let transport = ReqwestTransport::new(Some(Duration::from_secs(2))).unwrap();
        let err = transport
            .execute(TransportRequest {
                method: Method::POST,
                url: "http://127.0.0.1:9/payment/verify".to_string(),
                headers: Vec::new(),
                body: "{}".to_string(),
            })
            .await
            .unwrap_err();

        assert!(err.is_communication());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = TransportRequest {
            method: Method::POST,
            url: "http://localhost".to_string(),
            headers: vec![("merchantId".to_string(), "m-1".to_string())],
            body: String::new(),
        };
        assert_eq!(request.header("merchantid"), Some("m-1"));
        assert_eq!(request.header("signature"), None);
    }
}
