use crate::error::{CryptoError, Result};
use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;

/// Password-based authenticated encryption for single field values.
///
/// Wire format: base64(salt || nonce || ciphertext). Salt and nonce are
/// freshly random on every call, so encrypting the same value under the
/// same password twice yields different ciphertext both times.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_SIZE];
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = cipher_for(password, &salt)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("AEAD encrypt failed: {}", e)))?;

    let mut wire = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
    wire.extend_from_slice(&salt);
    wire.extend_from_slice(&nonce_bytes);
    wire.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(wire))
}

/// Decrypt a value produced by [`encrypt`].
///
/// Fails with a decryption error on malformed base64, truncated wire data,
/// or authentication failure (wrong password, tampered ciphertext).
pub fn decrypt(ciphertext: &str, password: &str) -> Result<String> {
    let wire = BASE64
        .decode(ciphertext)
        .map_err(|e| CryptoError::Decryption(format!("invalid base64: {}", e)))?;

    if wire.len() < SALT_SIZE + NONCE_SIZE {
        return Err(CryptoError::Decryption("ciphertext too short".to_string()));
    }

    let (salt, rest) = wire.split_at(SALT_SIZE);
    let (nonce_bytes, body) = rest.split_at(NONCE_SIZE);

    let cipher = cipher_for(password, salt)?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), body)
            .map_err(|_| CryptoError::Decryption("AEAD authentication failed".to_string()))?,
    );

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".to_string()))
}

fn cipher_for(password: &str, salt: &[u8]) -> Result<ChaCha20Poly1305> {
    let mut key = Zeroizing::new([0u8; 32]);
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, key.as_mut())
        .map_err(|e| CryptoError::KeyDerivation(format!("argon2 failed: {}", e)))?;

    ChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| CryptoError::Encryption(format!("key init failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let encrypted = encrypt("o@x.com", "password").unwrap();
        assert_eq!(decrypt(&encrypted, "password").unwrap(), "o@x.com");
    }

    #[test]
    fn test_encryption_is_nondeterministic() {
        let a = encrypt("same value", "password").unwrap();
        let b = encrypt("same value", "password").unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, "password").unwrap(), "same value");
        assert_eq!(decrypt(&b, "password").unwrap(), "same value");
    }

    #[test]
    fn test_wrong_password_rejected() {
        let encrypted = encrypt("secret", "password").unwrap();
        assert!(matches!(
            decrypt(&encrypted, "other password"),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let encrypted = encrypt("secret", "password").unwrap();
        let mut wire = BASE64.decode(&encrypted).unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        let tampered = BASE64.encode(wire);
        assert!(decrypt(&tampered, "password").is_err());
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(decrypt("not base64 at all!!!", "password").is_err());
        assert!(decrypt(&BASE64.encode(b"short"), "password").is_err());
    }

    #[test]
    fn test_empty_value_roundtrip() {
        let encrypted = encrypt("", "password").unwrap();
        assert_eq!(decrypt(&encrypted, "password").unwrap(), "");
    }
}
