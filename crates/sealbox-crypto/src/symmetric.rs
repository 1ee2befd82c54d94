//! AES-256-CBC bulk payload encryption.
//!
//! Every call to [`SymmetricKeyManager::encrypt`] draws its own random IV
//! and ships it with the ciphertext, so no IV state is shared between
//! calls or threads.
//!
//! Wire layout (before base64):
//!
//! ```text
//! [16-byte IV] [AES-256-CBC body, PKCS#7 padded] [32-byte HMAC-SHA256 tag]
//! ```
//!
//! The tag covers IV and body. Encryption and MAC keys are derived from the
//! 256-bit symmetric key with HKDF-SHA256.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::codec;
use crate::error::CryptoError;
use crate::key::{Key, KeyMaterial, SYMMETRIC_KEY_SIZE};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// IV size for AES-CBC (one block).
pub const IV_SIZE: usize = 16;

/// HMAC-SHA256 tag size.
pub const TAG_SIZE: usize = 32;

const BLOCK_SIZE: usize = 16;

/// HKDF salt for domain separation.
const HKDF_SALT: &[u8] = b"sealbox-symmetric-hkdf-salt-v1";
const HKDF_INFO_ENC: &[u8] = b"sealbox-aes256-cbc-v1";
const HKDF_INFO_MAC: &[u8] = b"sealbox-hmac-sha256-v1";

struct SubKeys {
    enc: Zeroizing<[u8; SYMMETRIC_KEY_SIZE]>,
    mac: Zeroizing<[u8; SYMMETRIC_KEY_SIZE]>,
}

fn derive_subkeys(key: &[u8; SYMMETRIC_KEY_SIZE]) -> Result<SubKeys, CryptoError> {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), key);
    let mut enc = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
    let mut mac = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
    hk.expand(HKDF_INFO_ENC, enc.as_mut_slice())
        .map_err(|e| CryptoError::Provider(format!("HKDF expand failed: {e}")))?;
    hk.expand(HKDF_INFO_MAC, mac.as_mut_slice())
        .map_err(|e| CryptoError::Provider(format!("HKDF expand failed: {e}")))?;
    Ok(SubKeys { enc, mac })
}

fn mac_for(mac_key: &[u8], iv: &[u8], body: &[u8]) -> Result<HmacSha256, CryptoError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(mac_key)
        .map_err(|e| CryptoError::Provider(format!("HMAC init failed: {e}")))?;
    mac.update(iv);
    mac.update(body);
    Ok(mac)
}

/// Generates, serializes and uses AES-256 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricKeyManager;

impl SymmetricKeyManager {
    pub const fn new() -> Self {
        Self
    }

    /// Generate a fresh random 256-bit key.
    pub fn generate_key(&self) -> Key {
        let mut bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        Key::new(KeyMaterial::Aes256(bytes), true)
    }

    /// Export the raw key bytes as base64.
    pub fn export_key(&self, key: &Key) -> Result<String, CryptoError> {
        let bytes = key.symmetric_bytes()?;
        key.require_extractable()?;
        Ok(codec::encode(bytes))
    }

    /// Import a key from base64 raw bytes.
    pub fn import_key(&self, encoded: &str) -> Result<Key, CryptoError> {
        let raw = Zeroizing::new(
            codec::decode(encoded).map_err(|e| CryptoError::KeyFormat(e.to_string()))?,
        );
        if raw.len() != SYMMETRIC_KEY_SIZE {
            return Err(CryptoError::KeyFormat(format!(
                "expected {SYMMETRIC_KEY_SIZE} key bytes, got {}",
                raw.len()
            )));
        }
        let mut bytes = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
        bytes.copy_from_slice(&raw);
        Ok(Key::new(KeyMaterial::Aes256(bytes), true))
    }

    /// Encrypt UTF-8 text under `key`, returning base64 ciphertext.
    pub fn encrypt(&self, key: &Key, plaintext: &str) -> Result<String, CryptoError> {
        let subkeys = derive_subkeys(key.symmetric_bytes()?)?;

        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let body = Aes256CbcEnc::new_from_slices(subkeys.enc.as_slice(), &iv)
            .map_err(|e| CryptoError::Provider(format!("AES-CBC init failed: {e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        let tag = mac_for(subkeys.mac.as_slice(), &iv, &body)?
            .finalize()
            .into_bytes();

        let mut out = Vec::with_capacity(IV_SIZE + body.len() + TAG_SIZE);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&body);
        out.extend_from_slice(&tag);
        Ok(codec::encode(&out))
    }

    /// Decrypt base64 ciphertext with a base64-encoded key.
    pub fn decrypt(&self, encoded_key: &str, ciphertext: &str) -> Result<String, CryptoError> {
        let key = self.import_key(encoded_key)?;
        self.decrypt_with_key(&key, ciphertext)
    }

    /// Decrypt base64 ciphertext with a key handle already in hand.
    pub fn decrypt_with_key(&self, key: &Key, ciphertext: &str) -> Result<String, CryptoError> {
        let subkeys = derive_subkeys(key.symmetric_bytes()?)?;
        let data = codec::decode(ciphertext)?;

        if data.len() < IV_SIZE + BLOCK_SIZE + TAG_SIZE
            || (data.len() - IV_SIZE - TAG_SIZE) % BLOCK_SIZE != 0
        {
            return Err(CryptoError::Operation(format!(
                "ciphertext of {} bytes is not a valid IV, body and tag layout",
                data.len()
            )));
        }
        let (iv, rest) = data.split_at(IV_SIZE);
        let (body, tag) = rest.split_at(rest.len() - TAG_SIZE);

        mac_for(subkeys.mac.as_slice(), iv, body)?
            .verify_slice(tag)
            .map_err(|_| {
                debug!("Symmetric ciphertext failed authentication");
                CryptoError::Operation("authentication tag mismatch".into())
            })?;

        let plaintext = Aes256CbcDec::new_from_slices(subkeys.enc.as_slice(), iv)
            .map_err(|e| CryptoError::Provider(format!("AES-CBC init failed: {e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|e| CryptoError::Operation(format!("invalid padding: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::Encoding(format!("plaintext is not UTF-8: {e}")))
    }
}
