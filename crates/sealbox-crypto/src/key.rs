//! Key handles.
//!
//! A [`Key`] owns its material and carries a fixed algorithm and role.
//! Operations check the role at runtime and fail with
//! [`CryptoError::KeyRole`] when handed the wrong kind of key.

use std::fmt;

use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Symmetric key size in bytes (AES-256).
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Algorithm a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// RSA with OAEP padding over SHA-256.
    RsaOaepSha256,
    /// AES-256 in CBC mode.
    Aes256Cbc,
}

/// Role of a key within its algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Encrypt-only half of a key pair.
    Public,
    /// Decrypt-only half of a key pair.
    Private,
    /// Encrypts and decrypts.
    Symmetric,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Symmetric => "symmetric",
        })
    }
}

#[derive(Clone)]
pub(crate) enum KeyMaterial {
    RsaPublic(RsaPublicKey),
    RsaPrivate(RsaPrivateKey),
    Aes256(Zeroizing<[u8; SYMMETRIC_KEY_SIZE]>),
}

/// An owned handle to cryptographic material.
///
/// Keys are immutable after creation and safe to share across threads.
#[derive(Clone)]
pub struct Key {
    material: KeyMaterial,
    extractable: bool,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Key");
        s.field("algorithm", &self.algorithm())
            .field("role", &self.role())
            .field("extractable", &self.extractable);
        match &self.material {
            KeyMaterial::RsaPublic(pk) => s.field("modulus_bits", &(pk.size() * 8)),
            KeyMaterial::RsaPrivate(_) | KeyMaterial::Aes256(_) => {
                s.field("material", &"[REDACTED]")
            }
        };
        s.finish()
    }
}

impl Key {
    pub(crate) const fn new(material: KeyMaterial, extractable: bool) -> Self {
        Self {
            material,
            extractable,
        }
    }

    pub const fn algorithm(&self) -> KeyAlgorithm {
        match self.material {
            KeyMaterial::RsaPublic(_) | KeyMaterial::RsaPrivate(_) => KeyAlgorithm::RsaOaepSha256,
            KeyMaterial::Aes256(_) => KeyAlgorithm::Aes256Cbc,
        }
    }

    pub const fn role(&self) -> KeyRole {
        match self.material {
            KeyMaterial::RsaPublic(_) => KeyRole::Public,
            KeyMaterial::RsaPrivate(_) => KeyRole::Private,
            KeyMaterial::Aes256(_) => KeyRole::Symmetric,
        }
    }

    /// Whether the key material may be exported.
    pub const fn is_extractable(&self) -> bool {
        self.extractable
    }

    fn wrong_role(&self, expected: KeyRole) -> CryptoError {
        CryptoError::KeyRole {
            expected,
            actual: self.role(),
        }
    }

    pub(crate) fn rsa_public(&self) -> Result<&RsaPublicKey, CryptoError> {
        match &self.material {
            KeyMaterial::RsaPublic(pk) => Ok(pk),
            _ => Err(self.wrong_role(KeyRole::Public)),
        }
    }

    pub(crate) fn rsa_private(&self) -> Result<&RsaPrivateKey, CryptoError> {
        match &self.material {
            KeyMaterial::RsaPrivate(sk) => Ok(sk),
            _ => Err(self.wrong_role(KeyRole::Private)),
        }
    }

    pub(crate) fn symmetric_bytes(&self) -> Result<&[u8; SYMMETRIC_KEY_SIZE], CryptoError> {
        match &self.material {
            KeyMaterial::Aes256(bytes) => Ok(&**bytes),
            _ => Err(self.wrong_role(KeyRole::Symmetric)),
        }
    }

    pub(crate) fn require_extractable(&self) -> Result<(), CryptoError> {
        if self.extractable {
            Ok(())
        } else {
            Err(CryptoError::NotExtractable)
        }
    }

    /// Compute a colon-separated hex fingerprint of a public key.
    ///
    /// Hashes the SPKI DER encoding with SHA-256. Fails with
    /// [`CryptoError::KeyRole`] for anything but a public key.
    pub fn fingerprint(&self) -> Result<String, CryptoError> {
        let der = self
            .rsa_public()?
            .to_public_key_der()
            .map_err(|e| CryptoError::Provider(format!("SPKI encoding failed: {e}")))?;
        Ok(fingerprint_of(der.as_bytes()))
    }
}

/// A public/private key pair produced by one generation call.
#[derive(Clone)]
pub struct KeyPair {
    pub public: Key,
    pub private: Key,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Compute a colon-separated hex SHA-256 fingerprint of arbitrary bytes.
pub fn fingerprint_of(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(bytes);
    hash.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Check a public key against an expected fingerprint in constant time.
pub fn verify_fingerprint(key: &Key, expected_fingerprint: &str) -> Result<bool, CryptoError> {
    let actual = key.fingerprint()?;
    Ok(actual
        .as_bytes()
        .ct_eq(expected_fingerprint.as_bytes())
        .into())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::asymmetric::test_key_pair;
    use crate::symmetric::SymmetricKeyManager;

    #[test]
    fn generated_pair_has_expected_tags() {
        let pair = test_key_pair();
        assert_eq!(pair.public.algorithm(), KeyAlgorithm::RsaOaepSha256);
        assert_eq!(pair.public.role(), KeyRole::Public);
        assert_eq!(pair.private.algorithm(), KeyAlgorithm::RsaOaepSha256);
        assert_eq!(pair.private.role(), KeyRole::Private);
        assert!(pair.public.is_extractable());
        assert!(pair.private.is_extractable());
    }

    #[test]
    fn symmetric_key_has_expected_tags() {
        let key = SymmetricKeyManager::new().generate_key();
        assert_eq!(key.algorithm(), KeyAlgorithm::Aes256Cbc);
        assert_eq!(key.role(), KeyRole::Symmetric);
    }

    #[test]
    fn fingerprint_is_human_readable_hex() {
        let fp = test_key_pair().public.fingerprint().unwrap();

        // SHA-256 = 32 bytes = 32 hex pairs + 31 colons = 95 chars
        assert_eq!(fp.len(), 95);
        for segment in fp.split(':') {
            assert_eq!(segment.len(), 2);
            assert!(segment.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn fingerprint_requires_public_key() {
        let err = test_key_pair().private.fingerprint().unwrap_err();
        assert!(matches!(
            err,
            CryptoError::KeyRole {
                expected: KeyRole::Public,
                actual: KeyRole::Private
            }
        ));
    }

    #[test]
    fn verify_fingerprint_matches_only_same_key() {
        let pair = test_key_pair();
        let fp = pair.public.fingerprint().unwrap();
        assert!(verify_fingerprint(&pair.public, &fp).unwrap());
        assert!(!verify_fingerprint(&pair.public, "00:11").unwrap());
    }

    #[test]
    fn debug_impl_redacts_secret_material() {
        let pair = test_key_pair();
        let debug_output = format!("{pair:?} {:?}", pair.private);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("modulus_bits"));

        let sym = SymmetricKeyManager::new().generate_key();
        let bytes = sym.symmetric_bytes().unwrap();
        let debug_output = format!("{sym:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(&hex::encode(bytes)));
    }

    #[test]
    fn keys_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Key>();
        assert_send_sync::<KeyPair>();
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(KeyRole::Public.to_string(), "public");
        assert_eq!(KeyRole::Private.to_string(), "private");
        assert_eq!(KeyRole::Symmetric.to_string(), "symmetric");
    }
}
