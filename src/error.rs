//! Error handling for the scrypt stratum miner
//!
//! One error type covers the whole client. Decode failures are local to a
//! single line or job and never end a session; everything else is fatal.

use thiserror::Error;

/// Result type alias for mining operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the mining client
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors outside the pool connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The pool connection could not be established
    #[error("Failed to connect to {address}: {message}")]
    Connect { address: String, message: String },

    /// Malformed line or job payload
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Socket failure after the connection was established
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Every 32-bit nonce was tried without a winning hash
    #[error("Nonce space exhausted without a solution")]
    NonceSpaceExhausted,

    /// Hasher construction errors
    #[error("Cryptographic error: {message}")]
    Crypto { message: String },

    /// A search was cancelled because its job was superseded
    #[error("Operation was cancelled: {operation}")]
    Cancelled { operation: String },

    /// Invalid state errors
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connect error
    pub fn connect(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Whether this error ends the mining session
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Decode { .. } | Error::Cancelled { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Io(_) => "io",
            Error::Config { .. } => "config",
            Error::Connect { .. } => "connect",
            Error::Decode { .. } => "decode",
            Error::Transport { .. } => "transport",
            Error::NonceSpaceExhausted => "nonce_space_exhausted",
            Error::Crypto { .. } => "crypto",
            Error::Cancelled { .. } => "cancelled",
            Error::InvalidState { .. } => "invalid_state",
        }
    }
}
