//! AES-256-GCM sealing of integration credentials stored in the database.
//!
//! The key is 32 bytes, supplied hex-encoded through the `ENCRYPTION_KEY`
//! setting. Sealed values are `base64(nonce || ciphertext)` so they fit in a
//! text column.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use service::config::Config;
use thiserror::Error;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Invalid encryption key: must be 32 bytes (64 hex characters)")]
    InvalidKey,

    #[error("Failed to decode hex key: {0}")]
    HexDecodeError(#[from] hex::FromHexError),

    #[error("Failed to decode base64 ciphertext: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("Failed to (de)serialize sealed value: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed - data may be corrupted or key is incorrect")]
    DecryptionFailed,

    #[error("Ciphertext too short - missing nonce")]
    CiphertextTooShort,

    #[error("No encryption key configured")]
    NoKeyConfigured,
}

/// An AES-256-GCM cipher bound to one key.
pub struct Cipher {
    inner: Aes256Gcm,
}

impl Cipher {
    pub fn from_hex(key_hex: &str) -> Result<Self, EncryptionError> {
        let bytes = hex::decode(key_hex.trim())?;
        if bytes.len() != KEY_SIZE {
            return Err(EncryptionError::InvalidKey);
        }
        let inner = Aes256Gcm::new_from_slice(&bytes).map_err(|_| EncryptionError::InvalidKey)?;
        Ok(Self { inner })
    }

    /// Builds the cipher from the configured `encryption_key`.
    pub fn from_config(config: &Config) -> Result<Self, EncryptionError> {
        let key_hex = config
            .encryption_key()
            .ok_or(EncryptionError::NoKeyConfigured)?;
        Self::from_hex(&key_hex)
    }

    /// Encrypts `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill(&mut nonce_bytes);

        let ciphertext = self
            .inner
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| EncryptionError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend(ciphertext);
        Ok(BASE64.encode(sealed))
    }

    pub fn open(&self, sealed: &str) -> Result<String, EncryptionError> {
        let combined = BASE64.decode(sealed)?;
        if combined.len() < NONCE_SIZE {
            return Err(EncryptionError::CiphertextTooShort);
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);

        let plaintext = self
            .inner
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| EncryptionError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| EncryptionError::DecryptionFailed)
    }

    pub fn seal_json<T: Serialize>(&self, value: &T) -> Result<String, EncryptionError> {
        self.seal(&serde_json::to_string(value)?)
    }

    pub fn open_json<T: DeserializeOwned>(&self, sealed: &str) -> Result<T, EncryptionError> {
        Ok(serde_json::from_str(&self.open(sealed)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn sealed_values_open_with_the_same_key() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        let sealed = cipher.seal("splynx-secret").unwrap();

        assert_ne!(sealed, "splynx-secret");
        assert_eq!(cipher.open(&sealed).unwrap(), "splynx-secret");
    }

    #[test]
    fn each_seal_uses_a_fresh_nonce() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        let first = cipher.seal("same").unwrap();
        let second = cipher.seal("same").unwrap();

        assert_ne!(first, second);
        assert_eq!(cipher.open(&second).unwrap(), "same");
    }

    #[test]
    fn short_keys_are_rejected() {
        assert!(matches!(
            Cipher::from_hex("abcd"),
            Err(EncryptionError::InvalidKey)
        ));
        assert!(matches!(
            Cipher::from_hex("not hex"),
            Err(EncryptionError::HexDecodeError(_))
        ));
    }

    #[test]
    fn a_different_key_cannot_open() {
        let sealed = Cipher::from_hex(TEST_KEY).unwrap().seal("secret").unwrap();
        let other = Cipher::from_hex(&"f".repeat(64)).unwrap();

        assert!(matches!(
            other.open(&sealed),
            Err(EncryptionError::DecryptionFailed)
        ));
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        assert!(matches!(
            cipher.open("YWJj"),
            Err(EncryptionError::CiphertextTooShort)
        ));
        assert!(matches!(
            cipher.open("!!!"),
            Err(EncryptionError::Base64DecodeError(_))
        ));
    }

    #[test]
    fn credential_maps_survive_sealing() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        let mut credentials = BTreeMap::new();
        credentials.insert("api_key".to_string(), "k-123".to_string());
        credentials.insert("api_secret".to_string(), "s-456".to_string());

        let sealed = cipher.seal_json(&credentials).unwrap();
        let opened: BTreeMap<String, String> = cipher.open_json(&sealed).unwrap();

        assert_eq!(opened, credentials);
    }

    #[test]
    fn missing_config_key_is_reported() {
        let config = Config::from_env();
        if config.encryption_key().is_none() {
            assert!(matches!(
                Cipher::from_config(&config),
                Err(EncryptionError::NoKeyConfigured)
            ));
        }
    }
}
