//! Crypto error types.

use crate::key::KeyRole;

/// Errors from cryptographic operations.
///
/// Nothing in this crate recovers from or retries a failure: every
/// operation is deterministic in its inputs, so each error surfaces
/// unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Input is not valid base64, or decrypted bytes are not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Imported key bytes do not match the expected format, size or algorithm.
    #[error("Invalid key format: {0}")]
    KeyFormat(String),

    #[error("Wrong key role: expected {expected} key, got {actual} key")]
    KeyRole { expected: KeyRole, actual: KeyRole },

    #[error("Key material is not extractable")]
    NotExtractable,

    #[error("Payload too large: {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize, actual: usize },

    /// The underlying provider could not perform the operation.
    #[error("Crypto provider error: {0}")]
    Provider(String),

    /// Decryption failed integrity or padding validation.
    #[error("Crypto operation failed: {0}")]
    Operation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<rsa::Error> for CryptoError {
    fn from(e: rsa::Error) -> Self {
        match e {
            rsa::Error::Decryption => Self::Operation(e.to_string()),
            rsa::Error::Pkcs1(_) | rsa::Error::Pkcs8(_) | rsa::Error::InvalidModulus => {
                Self::KeyFormat(e.to_string())
            }
            other => Self::Provider(other.to_string()),
        }
    }
}
