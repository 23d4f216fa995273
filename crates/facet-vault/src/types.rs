use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Current serialization version of [`PasswordMap`]. Bump when the
/// per-field password derivation scheme changes so old envelopes can be
/// told apart from new ones.
pub const PASSWORD_MAP_VERSION: u32 = 1;

/// The stable, globally unique identifier of a user: their ed25519
/// verifying key, deterministically derived from a secret phrase.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[..8]))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected a 32-byte public key"))?;
        Ok(Self(bytes))
    }
}

/// A user's identity: public key plus an optional signed proof that the
/// holder of the matching private key authorized the current session.
///
/// Immutable once constructed; an identity change replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub public_key: PublicKey,
    pub message: String,
    pub signature: Vec<u8>,
}

impl Identity {
    /// An unsigned identity claim, as sent to the account authority.
    pub fn claim(public_key: PublicKey) -> Self {
        Self {
            public_key,
            message: String::new(),
            signature: Vec::new(),
        }
    }
}

/// Application-facing vault: field names mapped to cleartext values.
///
/// Field names are lowercased on insert and lookup, so field identity is
/// case-insensitive and names differing only in case collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearVault(BTreeMap<String, String>);

impl ClearVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Storage-facing vault: field names mapped to ciphertext values. Never
/// mixed with cleartext in a single structure; which API produced a
/// mapping determines its encryption state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherVault(BTreeMap<String, String>);

impl CipherVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ciphertext: impl Into<String>) {
        self.0.insert(name.into(), ciphertext.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The payload of a disclosure envelope: lowercase field names mapped to
/// their per-field passwords. Strongly typed so malformed envelopes are
/// rejected during deserialization instead of crashing later.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordMap {
    pub version: u32,
    pub passwords: BTreeMap<String, String>,
}

impl PasswordMap {
    pub fn new(passwords: BTreeMap<String, String>) -> Self {
        Self {
            version: PASSWORD_MAP_VERSION,
            passwords,
        }
    }
}

/// An asymmetrically encrypted [`PasswordMap`] addressed to one recipient.
///
/// A capability: whoever holds the matching private key can decrypt exactly
/// the fields whose passwords were included, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureEnvelope(Vec<u8>);

impl DisclosureEnvelope {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_vault_names_are_case_insensitive() {
        let mut vault = ClearVault::new();
        vault.insert("Name", "x");
        assert_eq!(vault.get("name"), Some("x"));
        assert_eq!(vault.get("NAME"), Some("x"));
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_clear_vault_case_collision_last_write_wins() {
        let mut vault = ClearVault::new();
        vault.insert("email", "first");
        vault.insert("Email", "second");
        assert_eq!(vault.len(), 1);
        assert_eq!(vault.get("email"), Some("second"));
    }

    #[test]
    fn test_public_key_serde_roundtrip() {
        let key = PublicKey::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&key).unwrap();
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        assert!(serde_json::from_str::<PublicKey>("\"abcd\"").is_err());
    }

    #[test]
    fn test_password_map_rejects_unexpected_shape() {
        assert!(serde_json::from_str::<PasswordMap>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<PasswordMap>("{\"passwords\":{},\"extra\":1}").is_err());
    }

    #[test]
    fn test_identity_claim_is_unsigned() {
        let claim = Identity::claim(PublicKey::from_bytes([1u8; 32]));
        assert!(claim.message.is_empty());
        assert!(claim.signature.is_empty());
    }
}
