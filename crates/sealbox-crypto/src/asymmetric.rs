//! RSA-OAEP identity key pairs.
//!
//! Protects small payloads, typically an exported symmetric key, under
//! the recipient's public key. Public keys travel as base64 SPKI DER,
//! private keys as base64 PKCS#8 DER.

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::debug;

use crate::codec;
use crate::config::CryptoConfig;
use crate::error::CryptoError;
use crate::key::{Key, KeyMaterial, KeyPair};

/// Default RSA modulus size.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// Smallest modulus accepted on import.
pub const MIN_MODULUS_BITS: usize = 2048;

/// RSA public exponent (F4).
pub const PUBLIC_EXPONENT: u32 = 65_537;

/// Output size of the OAEP hash (SHA-256).
const OAEP_HASH_SIZE: usize = 32;

/// Largest plaintext OAEP-SHA256 can carry under a modulus of `modulus_bytes`.
///
/// 190 bytes for a 2048-bit modulus.
pub const fn max_payload_len(modulus_bytes: usize) -> usize {
    modulus_bytes.saturating_sub(2 * OAEP_HASH_SIZE + 2)
}

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Generates, serializes and uses RSA-OAEP key pairs.
#[derive(Debug, Clone)]
pub struct AsymmetricKeyManager {
    modulus_bits: usize,
}

impl Default for AsymmetricKeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AsymmetricKeyManager {
    /// Manager producing 2048-bit keys.
    pub const fn new() -> Self {
        Self {
            modulus_bits: DEFAULT_MODULUS_BITS,
        }
    }

    /// Manager using the modulus size from a validated config.
    pub fn from_config(config: &CryptoConfig) -> Result<Self, CryptoError> {
        config.validate()?;
        Ok(Self {
            modulus_bits: config.asymmetric.modulus_bits,
        })
    }

    pub const fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    /// Generate a fresh key pair with public exponent 65537.
    pub fn generate_key_pair(&self) -> Result<KeyPair, CryptoError> {
        let exponent = BigUint::from(PUBLIC_EXPONENT);
        let secret = RsaPrivateKey::new_with_exp(&mut OsRng, self.modulus_bits, &exponent)
            .map_err(|e| CryptoError::Provider(format!("RSA key generation failed: {e}")))?;
        let public = RsaPublicKey::from(&secret);
        debug!(modulus_bits = self.modulus_bits, "Generated RSA-OAEP key pair");
        Ok(KeyPair {
            public: Key::new(KeyMaterial::RsaPublic(public), true),
            private: Key::new(KeyMaterial::RsaPrivate(secret), true),
        })
    }

    /// Export a public key as base64 SPKI DER.
    pub fn export_public_key(&self, key: &Key) -> Result<String, CryptoError> {
        let pk = key.rsa_public()?;
        key.require_extractable()?;
        let der = pk
            .to_public_key_der()
            .map_err(|e| CryptoError::Provider(format!("SPKI encoding failed: {e}")))?;
        Ok(codec::encode(der.as_bytes()))
    }

    /// Export a private key as base64 PKCS#8 DER.
    ///
    /// `None` passes straight through, so a caller without a private key
    /// can use the same code path.
    pub fn export_private_key(&self, key: Option<&Key>) -> Result<Option<String>, CryptoError> {
        let Some(key) = key else {
            return Ok(None);
        };
        let sk = key.rsa_private()?;
        key.require_extractable()?;
        let der = sk
            .to_pkcs8_der()
            .map_err(|e| CryptoError::Provider(format!("PKCS#8 encoding failed: {e}")))?;
        Ok(Some(codec::encode(der.as_bytes())))
    }

    /// Import an encrypt-only public key from base64 SPKI DER.
    pub fn import_public_key(&self, encoded: &str) -> Result<Key, CryptoError> {
        let der = decode_key_text(encoded)?;
        let pk = RsaPublicKey::from_public_key_der(&der)
            .map_err(|e| CryptoError::KeyFormat(format!("not an RSA SPKI public key: {e}")))?;
        check_modulus(pk.n())?;
        Ok(Key::new(KeyMaterial::RsaPublic(pk), true))
    }

    /// Import a decrypt-only private key from base64 PKCS#8 DER.
    ///
    /// The key is validated before use and the resulting handle is not
    /// extractable.
    pub fn import_private_key(&self, encoded: &str) -> Result<Key, CryptoError> {
        let der = decode_key_text(encoded)?;
        let sk = RsaPrivateKey::from_pkcs8_der(&der)
            .map_err(|e| CryptoError::KeyFormat(format!("not an RSA PKCS#8 private key: {e}")))?;
        sk.validate()
            .map_err(|e| CryptoError::KeyFormat(format!("inconsistent RSA private key: {e}")))?;
        check_modulus(sk.n())?;
        debug!(modulus_bits = sk.size() * 8, "Imported RSA-OAEP private key");
        Ok(Key::new(KeyMaterial::RsaPrivate(sk), false))
    }

    /// Encrypt a base64 payload under a base64 SPKI public key.
    ///
    /// The decoded payload is encrypted in one block, so it must fit within
    /// [`max_payload_len`] of the key's modulus.
    pub fn encrypt(&self, plaintext: &str, public_key: &str) -> Result<String, CryptoError> {
        let data = codec::decode(plaintext)?;
        let key = self.import_public_key(public_key)?;
        let pk = key.rsa_public()?;

        let limit = max_payload_len(pk.size());
        if data.len() > limit {
            return Err(CryptoError::PayloadTooLarge {
                limit,
                actual: data.len(),
            });
        }

        let ciphertext = pk
            .encrypt(&mut OsRng, oaep(), &data)
            .map_err(|e| match e {
                rsa::Error::MessageTooLong => CryptoError::PayloadTooLarge {
                    limit,
                    actual: data.len(),
                },
                other => CryptoError::from(other),
            })?;
        Ok(codec::encode(&ciphertext))
    }

    /// Decrypt a base64 ciphertext with a private key handle, returning
    /// the payload as base64.
    pub fn decrypt(&self, ciphertext: &str, private_key: &Key) -> Result<String, CryptoError> {
        let sk = private_key.rsa_private()?;
        let data = codec::decode(ciphertext)?;
        let plaintext = sk.decrypt(oaep(), &data).map_err(|e| {
            debug!(error = %e, "RSA-OAEP decryption failed");
            CryptoError::Operation(e.to_string())
        })?;
        Ok(codec::encode(&plaintext))
    }
}

/// Base64 failures on key import are format errors: the caller handed us
/// something that is not an exported key.
fn decode_key_text(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    codec::decode(encoded).map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

fn check_modulus(n: &BigUint) -> Result<(), CryptoError> {
    let bits = n.bits();
    if bits < MIN_MODULUS_BITS {
        return Err(CryptoError::KeyFormat(format!(
            "RSA modulus of {bits} bits is below the {MIN_MODULUS_BITS}-bit minimum"
        )));
    }
    Ok(())
}

/// A 2048-bit key pair generated once per process and cloned out.
#[cfg(any(test, feature = "test-utils"))]
#[allow(clippy::expect_used)]
pub fn test_key_pair() -> KeyPair {
    static PAIR: std::sync::OnceLock<KeyPair> = std::sync::OnceLock::new();
    PAIR.get_or_init(|| {
        AsymmetricKeyManager::new()
            .generate_key_pair()
            .expect("test key pair generation")
    })
    .clone()
}
