//! Base64 text encoding for keys and ciphertext.
//!
//! Standard alphabet with padding, so values can travel inside JSON
//! messages and log lines.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::CryptoError;

/// Encode raw bytes as padded standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode padded standard base64 text.
pub fn decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(text)
        .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))
}
