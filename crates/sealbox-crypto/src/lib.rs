//! Sealbox Hybrid Encryption Library
//!
//! Primitives for point-to-point message exchange: callers pass base64
//! text in and get base64 text out, so keys and ciphertext can ride in
//! JSON messages.
//!
//! ## Crypto primitives
//!
//! - **Codec**: standard padded base64
//! - **Asymmetric**: RSA-2048 (e = 65537), OAEP with SHA-256; public keys as SPKI DER,
//!   private keys as PKCS#8 DER
//! - **Symmetric**: AES-256-CBC with a fresh random IV per message, authenticated
//!   with HMAC-SHA256 (subkeys via HKDF-SHA256)
//! - **Envelope**: per-message symmetric key wrapped under the recipient's RSA key

pub mod asymmetric;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod key;
pub mod symmetric;

#[cfg(any(test, feature = "test-utils"))]
pub use asymmetric::test_key_pair;
pub use asymmetric::{AsymmetricKeyManager, max_payload_len};
pub use config::{CryptoConfig, load_config};
pub use envelope::{SealedMessage, open, seal};
pub use error::CryptoError;
pub use key::{Key, KeyAlgorithm, KeyPair, KeyRole, fingerprint_of, verify_fingerprint};
pub use symmetric::{IV_SIZE, SymmetricKeyManager};
