use crate::error::{CryptoError, Result};
use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

/// Domain-separation salts. Changing any of these changes every derived
/// key, so they are part of the v1 wire contract.
const PHRASE_SALT: &[u8] = b"facet.v1/identity-seed";
const FIELD_PASSWORD_SALT: &[u8] = b"facet.v1/field-password";
const SIGNING_INFO: &[u8] = b"facet.v1/signing-key";

/// Deterministic key material derived from a secret phrase.
///
/// The same phrase always yields the same ed25519 keypair and the same
/// per-field passwords, so an owner can re-derive everything from the
/// phrase alone. Per-field passwords are a pure function of
/// (root seed, lowercased field name) and never touch the network.
///
/// Security: Debug is manually implemented to prevent secret leakage.
pub struct Keyring {
    signing: SigningKey,
    root: Zeroizing<[u8; 32]>,
}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyring")
            .field("public_key", &hex::encode(self.public_key()))
            .field("signing", &"<REDACTED>")
            .field("root", &"<REDACTED>")
            .finish()
    }
}

impl Keyring {
    /// Derive a keyring from a secret phrase (argon2id, fixed application salt).
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        if phrase.trim().is_empty() {
            return Err(CryptoError::KeyDerivation(
                "secret phrase is empty".to_string(),
            ));
        }

        let mut root = Zeroizing::new([0u8; 32]);
        Argon2::default()
            .hash_password_into(phrase.as_bytes(), PHRASE_SALT, root.as_mut())
            .map_err(|e| CryptoError::KeyDerivation(format!("argon2 failed: {}", e)))?;

        let mut seed = Zeroizing::new([0u8; 32]);
        Hkdf::<Sha256>::new(None, root.as_ref())
            .expand(SIGNING_INFO, seed.as_mut())
            .map_err(|e| CryptoError::KeyDerivation(format!("hkdf expand failed: {}", e)))?;

        let signing = SigningKey::from_bytes(&seed);

        Ok(Self { signing, root })
    }

    /// Generate a fresh, high-entropy secret phrase (hex-encoded 256-bit seed).
    pub fn generate_phrase() -> String {
        let mut entropy = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut entropy);
        hex::encode(entropy)
    }

    /// The stable identity of this keyring: the ed25519 verifying key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// Sign a session message, returning the detached 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing.sign(message).to_bytes().to_vec()
    }

    /// Verify a signature against an identity public key.
    pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> Result<()> {
        let verifying = VerifyingKey::from_bytes(public_key)
            .map_err(|e| CryptoError::InvalidKey(format!("bad public key: {}", e)))?;
        let signature = Signature::from_slice(signature)
            .map_err(|e| CryptoError::InvalidKey(format!("bad signature: {}", e)))?;
        verifying
            .verify(message, &signature)
            .map_err(|_| CryptoError::InvalidKey("signature verification failed".to_string()))
    }

    /// Derive the symmetric password protecting one vault field.
    ///
    /// Field names are lowercased before derivation so read and write paths
    /// agree regardless of caller casing. Different names yield uncorrelated
    /// passwords under HKDF.
    pub fn field_password(&self, field_name: &str) -> Result<String> {
        let normalized = field_name.to_lowercase();
        let mut okm = Zeroizing::new([0u8; 32]);
        Hkdf::<Sha256>::new(Some(FIELD_PASSWORD_SALT), self.root.as_ref())
            .expand(normalized.as_bytes(), okm.as_mut())
            .map_err(|e| CryptoError::KeyDerivation(format!("hkdf expand failed: {}", e)))?;
        Ok(BASE64.encode(okm.as_ref()))
    }

    /// The X25519 secret matching `public_key()` under the birational
    /// ed25519 -> curve25519 map. Used by `envelope::open`.
    pub(crate) fn agreement_secret(&self) -> StaticSecret {
        StaticSecret::from(self.signing.to_scalar_bytes())
    }
}
