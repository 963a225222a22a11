//! Password encryption at rest, grounded in `common/encryption.py`'s
//! `encrypt_password`/`decrypt_password`. The original uses Fernet
//! (AES-128-CBC + HMAC); this workspace's dependency stack carries
//! `aes-gcm` instead (DESIGN.md: dependency swap, both are authenticated
//! symmetric encryption under a single process-level key), so ciphertexts
//! are not wire-compatible with the Python service, just the same shape
//! of guarantee: the key never leaves the process, the stored text never
//! reveals the password without it.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialCryptoError {
    #[error("invalid encryption key: {0}")]
    BadKey(String),
    #[error("failed to encrypt password")]
    EncryptFailed,
    #[error("failed to decrypt password")]
    DecryptFailed,
    #[error("malformed ciphertext")]
    Malformed,
}

/// Derived once from `FERNET_KEY` at startup and held by `AppState` behind
/// an `Arc`.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    /// `key_b64` must decode to exactly 32 bytes (the original's Fernet key
    /// is also base64; this implementation repurposes the same env var as
    /// a raw AES-256 key rather than a Fernet key, per DESIGN.md).
    pub fn new(key_b64: &str) -> Result<Self, CredentialCryptoError> {
        let raw = BASE64
            .decode(key_b64.trim())
            .map_err(|e| CredentialCryptoError::BadKey(e.to_string()))?;
        if raw.len() != 32 {
            return Err(CredentialCryptoError::BadKey(format!(
                "expected 32 decoded bytes, got {}",
                raw.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(&raw);
        Ok(Self { cipher: Aes256Gcm::new(key) })
    }

    /// Nonce is generated fresh per call and prepended to the ciphertext,
    /// then the whole thing base64-encoded for storage in a text column.
    pub fn encrypt(&self, plain_text: &str) -> Result<String, CredentialCryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plain_text.as_bytes())
            .map_err(|_| CredentialCryptoError::EncryptFailed)?;

        let mut combined = Vec::with_capacity(nonce.len() + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(combined))
    }

    pub fn decrypt(&self, encrypted_text: &str) -> Result<String, CredentialCryptoError> {
        let combined = BASE64
            .decode(encrypted_text.trim())
            .map_err(|_| CredentialCryptoError::Malformed)?;
        if combined.len() < 12 {
            return Err(CredentialCryptoError::Malformed);
        }
        let (nonce_bytes, ciphertext) = combined.split_at(12);
        let nonce = aes_gcm::Nonce::from_slice(nonce_bytes);
        let plain = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CredentialCryptoError::DecryptFailed)?;
        String::from_utf8(plain).map_err(|_| CredentialCryptoError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> String {
        BASE64.encode([7u8; 32])
    }

    #[test]
    fn round_trips_a_password() {
        let cipher = CredentialCipher::new(&test_key()).unwrap();
        let encrypted = cipher.encrypt("MyPDF@123").unwrap();
        assert_ne!(encrypted, "MyPDF@123");
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "MyPDF@123");
    }

    #[test]
    fn rejects_short_key() {
        let short = BASE64.encode([1u8; 16]);
        assert!(CredentialCipher::new(&short).is_err());
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let cipher = CredentialCipher::new(&test_key()).unwrap();
        let mut encrypted = cipher.encrypt("hunter2").unwrap();
        encrypted.push('A');
        assert!(cipher.decrypt(&encrypted).is_err());
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let cipher = CredentialCipher::new(&test_key()).unwrap();
        let a = cipher.encrypt("same-password").unwrap();
        let b = cipher.encrypt("same-password").unwrap();
        assert_ne!(a, b);
    }
}
