//! Gateway configuration and merchant credentials

use crate::{AzkiError, Result};
use std::env;
use std::time::Duration;

/// Production base URL of the AzkiVam gateway
pub const DEFAULT_BASE_URL: &str = "https://api.azkiloan.com";

/// Length in bytes of the decoded API key (AES-256)
pub const API_KEY_LENGTH: usize = 32;

/// Environment variable holding the hex-encoded API key
pub const API_KEY_ENV: &str = "AZKIVAM_API_KEY";
/// Environment variable holding the merchant identifier
pub const MERCHANT_ID_ENV: &str = "AZKIVAM_MERCHANT_ID";
/// Optional environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "AZKIVAM_BASE_URL";

/// Merchant credentials issued by AzkiVam
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Hex-encoded symmetric key used for request signatures
    pub api_key: String,
    /// Merchant identifier sent in the `merchantId` header
    pub merchant_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

impl Credentials {
    /// Surrounding whitespace is stripped; the signature embeds the key text
    pub fn new(api_key: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            merchant_id: merchant_id.into().trim().to_string(),
        }
    }

    /// Decode the API key into raw AES key material
    pub fn key_bytes(&self) -> Result<[u8; API_KEY_LENGTH]> {
        let bytes = hex::decode(&self.api_key)
            .map_err(|e| AzkiError::config(format!("API key is not valid hex: {}", e)))?;

        bytes.as_slice().try_into().map_err(|_| {
            AzkiError::config(format!(
                "API key must decode to {} bytes, got {}",
                API_KEY_LENGTH,
                bytes.len()
            ))
        })
    }
}

/// Configuration for an [`AzkiGateway`](crate::AzkiGateway)
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Merchant credentials
    pub credentials: Credentials,
    /// Base URL of the gateway
    pub base_url: String,
    /// Request timeout applied by the HTTP transport
    pub timeout: Option<Duration>,
    /// AzkiVam has no sandbox; any send fails while this is set
    pub test_mode: bool,
}

impl GatewayConfig {
    /// Create a new gateway config against the production host
    pub fn new(api_key: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(api_key, merchant_id),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            test_mode: false,
        }
    }

    /// Load credentials from `AZKIVAM_API_KEY` and `AZKIVAM_MERCHANT_ID`
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        let merchant_id = env::var(MERCHANT_ID_ENV).unwrap_or_default();

        if api_key.is_empty() || merchant_id.is_empty() {
            return Err(AzkiError::config(format!(
                "Missing credentials: {} and {} must be set",
                API_KEY_ENV, MERCHANT_ID_ENV
            )));
        }

        let mut config = Self::new(api_key, merchant_id);
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            if !base_url.is_empty() {
                config = config.with_base_url(base_url);
            }
        }
        Ok(config)
    }

    /// Validate the gateway configuration
    pub fn validate(&self) -> Result<()> {
        if self.credentials.merchant_id.is_empty() {
            return Err(AzkiError::config("Merchant id cannot be empty"));
        }
        if self.credentials.api_key.is_empty() {
            return Err(AzkiError::config("API key cannot be empty"));
        }
        self.credentials.key_bytes()?;

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| AzkiError::config(format!("Invalid base URL: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AzkiError::config(
                "Base URL must start with http:// or https://",
            ));
        }

        Ok(())
    }

    /// Point the gateway at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set test mode
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_config_defaults() {
        let config = GatewayConfig::new(KEY, "merchant-1");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, None);
        assert!(!config.test_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = GatewayConfig::new(KEY, "merchant-1")
            .with_base_url("http://127.0.0.1:8080/")
            .with_timeout(Duration::from_secs(10))
            .with_test_mode(true);

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert!(config.test_mode);
    }

    #[test]
    fn test_key_bytes() {
        let credentials = Credentials::new(KEY, "merchant-1");
        let key = credentials.key_bytes().unwrap();
        assert_eq!(key[0], 0x00);
        assert_eq!(key[31], 0x1f);
    }

    #[test]
    fn test_key_whitespace_stripped() {
        let config = GatewayConfig::new(format!("{}\n", KEY), " merchant-1 ");
        assert_eq!(config.credentials.api_key, KEY);
        assert_eq!(config.credentials.merchant_id, "merchant-1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_whitespace_in_field_rejected() {
        let mut credentials = Credentials::new(KEY, "merchant-1");
        credentials.api_key.push('\n');
        assert!(credentials.key_bytes().unwrap_err().is_config());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let not_hex = Credentials::new("zz-not-hex", "merchant-1");
        assert!(not_hex.key_bytes().unwrap_err().is_config());

        let short = Credentials::new("00ff", "merchant-1");
        let err = short.key_bytes().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GatewayConfig::new(KEY, "").validate().is_err());
        assert!(GatewayConfig::new("", "merchant-1").validate().is_err());
        assert!(GatewayConfig::new(KEY, "merchant-1")
            .with_base_url("ftp://api.azkiloan.com")
            .validate()
            .is_err());
        assert!(GatewayConfig::new(KEY, "merchant-1")
            .with_base_url("not a url")
            .validate()
            .is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let credentials = Credentials::new(KEY, "merchant-1");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains(KEY));
        assert!(debug.contains("merchant-1"));
    }
}
