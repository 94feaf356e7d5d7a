//! Request signatures for the AzkiVam gateway
//!
//! The gateway authenticates each call with a `signature` header: the string
//! `endpoint#timestamp#METHOD#apiKey` encrypted with AES-256-CBC under the
//! decoded API key and an all-zero IV, hex encoded. The zero IV is fixed by
//! the gateway, so identical inputs within the same second produce identical
//! signatures.

use crate::config::Credentials;
use crate::Result;
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use std::sync::Arc;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// AES block size, and so the length of the zero IV
pub const IV_LENGTH: usize = 16;

/// Source of the Unix timestamp embedded in signatures
pub trait Clock: Send + Sync {
    /// Current time in whole seconds since the Unix epoch
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Build the canonical plaintext that gets encrypted
pub fn plain_signature(endpoint: &str, timestamp: i64, method: &str, api_key: &str) -> String {
    format!("{}#{}#{}#{}", endpoint, timestamp, method, api_key)
}

/// Sign a request for `endpoint` at `timestamp`
///
/// Fails with a configuration error when the API key is not 32 bytes of hex.
pub fn sign(endpoint: &str, api_key: &str, method: &str, timestamp: i64) -> Result<String> {
    let credentials = Credentials::new(api_key, "");
    let key = credentials.key_bytes()?;
    let plaintext = plain_signature(endpoint, timestamp, method, &credentials.api_key);

    let encryptor = Aes256CbcEnc::new(&key.into(), &[0u8; IV_LENGTH].into());
    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    Ok(hex::encode(ciphertext))
}

/// Signs requests with fixed credentials and an injected clock
#[derive(Clone)]
pub struct Signer {
    api_key: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &"<redacted>")
            .field("clock", &"<clock>")
            .finish()
    }
}

impl Signer {
    pub fn new(api_key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            clock,
        }
    }

    /// Signature for `method` on `endpoint` at the clock's current time
    pub fn sign(&self, endpoint: &str, method: &str) -> Result<String> {
        sign(endpoint, &self.api_key, method, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_plain_signature() {
        assert_eq!(
            plain_signature("/payment/verify", 1700000000, "POST", "abcd"),
            "/payment/verify#1700000000#POST#abcd"
        );
    }

    #[test]
    fn test_sign_known_vector() {
        // openssl enc -aes-256-cbc -K <KEY> -iv 00..00
        let signature = sign("/payment/verify", KEY, "POST", 1700000000).unwrap();
        assert_eq!(
            signature,
            concat!(
                "3332b6d7f8f6cf5852f8ba66b0eaa2ec75b7262968c0c95376c0d8eff9371910",
                "82265d93bc772e0cb3e49433db795b5b008b60b11352056af0a482409a8ca402",
                "9e6959eb0ab80aa47d9250a6d37c0f4eb429fd9eeb1b9e5267a4f769d5ddae9c",
                "edbe6f6aa8da2eed275ce82eaab4d013",
            )
        );
    }

    #[test]
    fn test_padded_key_signs_like_clean_key() {
        let clean = sign("/payment/verify", KEY, "POST", 1700000000).unwrap();
        let padded_key = format!("{}\n", KEY);
        assert_eq!(
            sign("/payment/verify", &padded_key, "POST", 1700000000).unwrap(),
            clean
        );

        let signer = Signer::new(format!("  {}\r\n", KEY), Arc::new(FixedClock(1700000000)));
        assert_eq!(signer.sign("/payment/verify", "POST").unwrap(), clean);
    }

    #[test]
    fn test_sign_is_deterministic_within_a_second() {
        let signer = Signer::new(KEY, Arc::new(FixedClock(1700000000)));
        let first = signer.sign("/payment/purchase", "POST").unwrap();
        let second = signer.sign("/payment/purchase", "POST").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_differs_by_method_and_endpoint() {
        let signer = Signer::new(KEY, Arc::new(FixedClock(1700000000)));
        let base = signer.sign("/payment/purchase", "POST").unwrap();
        assert_ne!(base, signer.sign("/payment/purchase", "GET").unwrap());
        assert_ne!(base, signer.sign("/payment/verify", "POST").unwrap());
    }

    #[test]
    fn test_sign_differs_by_timestamp() {
        let first = sign("/payment/reverse", KEY, "POST", 1700000000).unwrap();
        let second = sign("/payment/reverse", KEY, "POST", 1700000001).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_ciphertext_is_block_aligned() {
        let signature = sign("/payment/status", KEY, "POST", 1700000000).unwrap();
        assert_eq!(signature.len() % (IV_LENGTH * 2), 0);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_bad_key_is_config_error() {
        assert!(sign("/payment/verify", "not-hex", "POST", 0)
            .unwrap_err()
            .is_config());
        assert!(sign("/payment/verify", "0011", "POST", 0)
            .unwrap_err()
            .is_config());
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2023-11-14
        assert!(SystemClock.now() > 1_700_000_000);
    }
}
