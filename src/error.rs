//! Error types for the azkivam library

use thiserror::Error;

/// Result type alias for azkivam operations
pub type Result<T> = std::result::Result<T, AzkiError>;

/// Main error type for azkivam operations
///
/// A ticket that the gateway rejected is not an error: `send` still returns
/// `Ok` and the response predicates report the outcome.
#[derive(Error, Debug)]
pub enum AzkiError {
    /// Configuration error (test mode, malformed API key, bad base URL)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required request field was missing before transmission
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// JSON encoding, HTTP exchange or response decoding failed
    #[error("Error communicating with azkivam gateway: {message}")]
    Communication { message: String, code: Option<u16> },
}

impl AzkiError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a communication error
    pub fn communication(message: impl Into<String>, code: Option<u16>) -> Self {
        Self::Communication {
            message: message.into(),
            code,
        }
    }

    /// Create a validation error for a missing parameter
    pub fn missing_parameter(name: &str) -> Self {
        Self::validation(format!("The {} parameter is required", name))
    }

    /// Status code attached to a communication error, if any
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Communication { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Communication { .. })
    }
}

impl From<reqwest::Error> for AzkiError {
    fn from(err: reqwest::Error) -> Self {
        let code = err.status().map(|status| status.as_u16());
        Self::communication(err.to_string(), code)
    }
}

impl From<serde_json::Error> for AzkiError {
    fn from(err: serde_json::Error) -> Self {
        Self::communication(err.to_string(), None)
    }
}
