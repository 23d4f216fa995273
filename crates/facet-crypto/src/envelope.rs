use crate::error::{CryptoError, Result};
use crate::keyring::Keyring;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use ed25519_dalek::VerifyingKey;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroizing;

/// Sealed-box asymmetric encryption addressed to an identity public key.
///
/// The recipient is named by their ed25519 identity key; sealing maps it to
/// the equivalent X25519 key, performs an ephemeral Diffie-Hellman, and
/// encrypts under an HKDF-derived ChaCha20-Poly1305 key. Only the holder of
/// the matching secret phrase can open the result.
///
/// Wire format: version byte || ephemeral X25519 public key (32) ||
/// nonce (12) || AEAD ciphertext.
const ENVELOPE_VERSION: u8 = 1;
const EPK_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const ENVELOPE_SALT: &[u8] = b"facet.v1/envelope";

/// Seal `plaintext` for the holder of `recipient_pk` (ed25519 bytes).
pub fn seal(recipient_pk: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
    let verifying = VerifyingKey::from_bytes(recipient_pk)
        .map_err(|e| CryptoError::InvalidKey(format!("bad recipient key: {}", e)))?;
    let recipient_x = PublicKey::from(verifying.to_montgomery().to_bytes());

    let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
    let epk = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient_x);
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidKey(
            "recipient key is a low-order point".to_string(),
        ));
    }

    let cipher = derive_cipher(shared.as_bytes(), epk.as_bytes(), recipient_x.as_bytes())?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::Encryption(format!("AEAD encrypt failed: {}", e)))?;

    let mut wire = Vec::with_capacity(1 + EPK_SIZE + NONCE_SIZE + ciphertext.len());
    wire.push(ENVELOPE_VERSION);
    wire.extend_from_slice(epk.as_bytes());
    wire.extend_from_slice(&nonce_bytes);
    wire.extend_from_slice(&ciphertext);

    Ok(wire)
}

/// Open a sealed envelope with the recipient's own keyring.
///
/// Fails with a decryption error if the envelope is malformed, carries an
/// unknown version, or was sealed for a different identity.
pub fn open(keyring: &Keyring, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < 1 + EPK_SIZE + NONCE_SIZE {
        return Err(CryptoError::Decryption("envelope too short".to_string()));
    }
    if sealed[0] != ENVELOPE_VERSION {
        return Err(CryptoError::Decryption(format!(
            "unsupported envelope version: {}",
            sealed[0]
        )));
    }

    let mut epk_bytes = [0u8; EPK_SIZE];
    epk_bytes.copy_from_slice(&sealed[1..1 + EPK_SIZE]);
    let epk = PublicKey::from(epk_bytes);
    let nonce_bytes = &sealed[1 + EPK_SIZE..1 + EPK_SIZE + NONCE_SIZE];
    let body = &sealed[1 + EPK_SIZE + NONCE_SIZE..];

    let secret = keyring.agreement_secret();
    let own_x = PublicKey::from(&secret);
    let shared = secret.diffie_hellman(&epk);
    if !shared.was_contributory() {
        return Err(CryptoError::Decryption(
            "ephemeral key is a low-order point".to_string(),
        ));
    }

    let cipher = derive_cipher(shared.as_bytes(), epk.as_bytes(), own_x.as_bytes())?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), body)
        .map_err(|_| {
            CryptoError::Decryption("envelope was not addressed to this identity".to_string())
        })?;

    Ok(Zeroizing::new(plaintext))
}

/// Bind the AEAD key to the full key transcript, not just the raw DH output.
fn derive_cipher(shared: &[u8], epk: &[u8], recipient: &[u8]) -> Result<ChaCha20Poly1305> {
    let mut info = Vec::with_capacity(EPK_SIZE * 2);
    info.extend_from_slice(epk);
    info.extend_from_slice(recipient);

    let mut key = Zeroizing::new([0u8; 32]);
    Hkdf::<Sha256>::new(Some(ENVELOPE_SALT), shared)
        .expand(&info, key.as_mut())
        .map_err(|e| CryptoError::KeyDerivation(format!("hkdf expand failed: {}", e)))?;

    ChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| CryptoError::Encryption(format!("key init failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let recipient = Keyring::from_phrase("recipient secret").unwrap();
        let sealed = seal(&recipient.public_key(), b"field passwords").unwrap();
        let opened = open(&recipient, &sealed).unwrap();
        assert_eq!(&**opened, b"field passwords");
    }

    #[test]
    fn test_wrong_recipient_cannot_open() {
        let recipient = Keyring::from_phrase("recipient secret").unwrap();
        let stranger = Keyring::from_phrase("stranger secret").unwrap();

        let sealed = seal(&recipient.public_key(), b"field passwords").unwrap();
        assert!(matches!(
            open(&stranger, &sealed),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_sealing_is_nondeterministic() {
        let recipient = Keyring::from_phrase("recipient secret").unwrap();
        let a = seal(&recipient.public_key(), b"payload").unwrap();
        let b = seal(&recipient.public_key(), b"payload").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_envelope_rejected() {
        let recipient = Keyring::from_phrase("recipient secret").unwrap();
        let mut sealed = seal(&recipient.public_key(), b"payload").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert!(open(&recipient, &sealed).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let recipient = Keyring::from_phrase("recipient secret").unwrap();
        let mut sealed = seal(&recipient.public_key(), b"payload").unwrap();
        sealed[0] = 9;
        let err = open(&recipient, &sealed).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_truncated_envelope_rejected() {
        let recipient = Keyring::from_phrase("recipient secret").unwrap();
        assert!(open(&recipient, &[ENVELOPE_VERSION; 10]).is_err());
    }
}
