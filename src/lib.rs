//! # azkivam - AzkiVam installment payment gateway client
//!
//! Create, verify, reverse, cancel and look up installment-payment tickets
//! on the AzkiVam REST API. Every request is signed with the merchant's API
//! key and sent as a single HTTP exchange; responses expose the gateway's
//! outcome through per-operation predicates.
//!
//! ```no_run
//! use azkivam::{AzkiGateway, GatewayConfig, Item, TicketRequest};
//!
//! # async fn run() -> azkivam::Result<()> {
//! let gateway = AzkiGateway::new(GatewayConfig::new(
//!     "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
//!     "merchant-1",
//! ))?;
//!
//! let request = TicketRequest::create(150_000, "https://shop.test/ok", "https://shop.test/fail")
//!     .with_mobile_number("09120000000")
//!     .with_item(Item::new("Kettle", 1, 150_000, "https://shop.test/kettle"));
//!
//! let response = gateway.send(&request).await?;
//! if let Some(url) = response.redirect_url() {
//!     println!("redirect customer to {}", url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod request;
pub mod response;
pub mod signature;
pub mod transport;

// Re-exports for convenience
pub use config::{Credentials, GatewayConfig, DEFAULT_BASE_URL};
pub use error::{AzkiError, Result};
pub use gateway::AzkiGateway;
pub use request::{
    FixedProviderId, Item, Operation, ProviderIdSource, RequestParameters, ThreadRngProviderId,
    TicketRequest,
};
pub use response::TicketResponse;
pub use signature::{Clock, FixedClock, SystemClock};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};

/// Current version of the azkivam library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(DEFAULT_BASE_URL, "https://api.azkiloan.com");
    }
}
