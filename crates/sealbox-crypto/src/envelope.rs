//! Hybrid envelope: one message sealed for one recipient.
//!
//! The sender generates a fresh symmetric key per message, encrypts the
//! text with it, and wraps the exported key under the recipient's RSA
//! public key. The recipient unwraps the key with their private key and
//! decrypts the text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asymmetric::AsymmetricKeyManager;
use crate::error::CryptoError;
use crate::key::Key;
use crate::symmetric::SymmetricKeyManager;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// A sealed message, ready to embed in a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedMessage {
    pub version: u32,
    /// Base64 RSA-OAEP ciphertext of the base64-exported symmetric key.
    pub wrapped_key: String,
    /// Base64 symmetric ciphertext (IV, body and tag).
    pub ciphertext: String,
}

impl SealedMessage {
    pub fn to_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string(self).map_err(|e| {
            CryptoError::SerializationError(format!("Failed to serialize sealed message: {e}"))
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        let msg: Self = serde_json::from_str(json).map_err(|e| {
            CryptoError::SerializationError(format!("Failed to parse sealed message: {e}"))
        })?;
        if msg.version != ENVELOPE_VERSION {
            return Err(CryptoError::SerializationError(format!(
                "unsupported sealed message version {}",
                msg.version
            )));
        }
        Ok(msg)
    }
}

/// Seal `plaintext` for the holder of the private key matching
/// `recipient_public_key` (base64 SPKI DER).
pub fn seal(
    asymmetric: &AsymmetricKeyManager,
    plaintext: &str,
    recipient_public_key: &str,
) -> Result<SealedMessage, CryptoError> {
    let symmetric = SymmetricKeyManager::new();
    let message_key = symmetric.generate_key();
    let ciphertext = symmetric.encrypt(&message_key, plaintext)?;
    let exported = symmetric.export_key(&message_key)?;
    let wrapped_key = asymmetric.encrypt(&exported, recipient_public_key)?;
    debug!(
        plaintext_len = plaintext.len(),
        "Sealed message for recipient"
    );
    Ok(SealedMessage {
        version: ENVELOPE_VERSION,
        wrapped_key,
        ciphertext,
    })
}

/// Open a sealed message with the recipient's private key.
pub fn open(
    asymmetric: &AsymmetricKeyManager,
    message: &SealedMessage,
    private_key: &Key,
) -> Result<String, CryptoError> {
    let exported = asymmetric.decrypt(&message.wrapped_key, private_key)?;
    let plaintext = SymmetricKeyManager::new().decrypt(&exported, &message.ciphertext)?;
    debug!(plaintext_len = plaintext.len(), "Opened sealed message");
    Ok(plaintext)
}
