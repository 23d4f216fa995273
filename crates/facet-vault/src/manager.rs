use crate::error::{Error, Result};
use crate::identity::Session;
use crate::ports::VaultStore;
use crate::types::{
    CipherVault, ClearVault, DisclosureEnvelope, PasswordMap, PublicKey, PASSWORD_MAP_VERSION,
};
use facet_crypto::{envelope, symmetric};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Field-level encryption of the current identity's vault plus the
/// selective-disclosure protocol for reading another identity's vault
/// with permission.
///
/// Holds a back-reference to the current session (the watch receiver from
/// [`IdentityManager::subscribe`](crate::IdentityManager::subscribe)) and
/// reads the latest published value at the start of every operation; an
/// identity change does not retarget an operation already in flight.
pub struct VaultManager {
    store: Arc<dyn VaultStore>,
    session: watch::Receiver<Option<Session>>,
}

impl VaultManager {
    pub fn new(store: Arc<dyn VaultStore>, session: watch::Receiver<Option<Session>>) -> Self {
        Self { store, session }
    }

    /// Fetch and decrypt the current identity's own vault.
    ///
    /// This is the owner-trusted path: a field of one's own vault failing
    /// to decrypt indicates corruption or a derivation mismatch, so the
    /// failure propagates naming the field instead of being dropped.
    pub async fn own_vault(&self) -> Result<ClearVault> {
        let session = self.current_session()?;
        let raw = self.store.get_data(&session.public_key()).await?;

        let mut clear = ClearVault::new();
        for (name, ciphertext) in raw.iter() {
            let password = session.keyring().field_password(name)?;
            let value = symmetric::decrypt(ciphertext, &password)
                .map_err(|_| Error::FieldDecryption {
                    field: name.clone(),
                })?;
            clear.insert(name, value);
        }

        debug!(fields = clear.len(), "decrypted own vault");
        Ok(clear)
    }

    /// Fetch the raw ciphertext vault for any public key. No decryption.
    pub async fn raw_vault(&self, owner: &PublicKey) -> Result<CipherVault> {
        self.store.get_data(owner).await
    }

    /// Encrypt every field of `vault` under the current identity and
    /// persist the whole mapping, replacing whatever the store held.
    ///
    /// Encryption draws fresh randomness per field, so two updates with
    /// identical cleartext produce different ciphertext. The identity in
    /// effect at call entry is used throughout, even if a new identity is
    /// published while the update is in flight.
    pub async fn update_own_vault(&self, vault: &ClearVault) -> Result<CipherVault> {
        let session = self.current_session()?;

        let mut sealed = CipherVault::new();
        for (name, value) in vault.iter() {
            let name = name.to_lowercase();
            let password = session.keyring().field_password(&name)?;
            let ciphertext = symmetric::encrypt(value, &password)?;
            sealed.insert(name, ciphertext);
        }

        let stored = self.store.update_data(&session.public_key(), sealed).await?;
        debug!(
            identity = %session.public_key(),
            fields = stored.len(),
            "updated own vault"
        );
        Ok(stored)
    }

    /// Disclose a subset of the current identity's fields to `recipient`.
    ///
    /// Builds the field-name to per-field-password map restricted to the
    /// requested names the owner actually has stored, and seals it for the
    /// recipient's key. Requested fields the owner does not possess are
    /// silently omitted; an empty request yields an envelope over an empty
    /// map.
    pub async fn share_fields<I, S>(
        &self,
        recipient: &PublicKey,
        field_names: I,
    ) -> Result<DisclosureEnvelope>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let session = self.current_session()?;
        let stored = self.store.get_data(&session.public_key()).await?;

        let mut passwords = BTreeMap::new();
        for name in field_names {
            let name = name.as_ref().to_lowercase();
            if !stored.contains(&name) {
                continue;
            }
            let password = session.keyring().field_password(&name)?;
            passwords.insert(name, password);
        }

        debug!(
            recipient = %recipient,
            disclosed = passwords.len(),
            "sealing disclosure envelope"
        );

        let payload = serde_json::to_vec(&PasswordMap::new(passwords))
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let sealed = envelope::seal(recipient.as_bytes(), &payload)?;
        Ok(DisclosureEnvelope::from_bytes(sealed))
    }

    /// Read the fields of `owner`'s vault that `envelope` discloses to the
    /// current identity.
    ///
    /// Best-effort by design: a field whose disclosed password no longer
    /// matches the stored ciphertext (a stale share, say) is logged and
    /// omitted rather than failing the whole call.
    pub async fn read_disclosed_vault(
        &self,
        owner: &PublicKey,
        envelope: &DisclosureEnvelope,
    ) -> Result<ClearVault> {
        let passwords = self.open_password_map(envelope)?;
        let raw = self.store.get_data(owner).await?;

        let mut clear = ClearVault::new();
        for (name, password) in &passwords {
            let Some(ciphertext) = raw.get(name) else {
                continue;
            };
            match symmetric::decrypt(ciphertext, password) {
                Ok(value) => {
                    clear.insert(name, value);
                }
                Err(e) => {
                    warn!(field = %name, error = %e, "skipping disclosed field that failed to decrypt");
                }
            }
        }

        Ok(clear)
    }

    /// Decrypt a disclosure envelope and return the raw per-field password
    /// map without touching any vault data. Useful for auditing which
    /// fields were actually disclosed.
    pub fn disclosed_passwords(
        &self,
        envelope: &DisclosureEnvelope,
    ) -> Result<BTreeMap<String, String>> {
        self.open_password_map(envelope)
    }

    fn open_password_map(
        &self,
        envelope: &DisclosureEnvelope,
    ) -> Result<BTreeMap<String, String>> {
        let session = self.current_session()?;
        let payload = envelope::open(session.keyring(), envelope.as_bytes())
            .map_err(|e| Error::Decryption(e.to_string()))?;
        let map: PasswordMap = serde_json::from_slice(&payload)
            .map_err(|e| Error::Decryption(format!("malformed password map: {}", e)))?;
        if map.version != PASSWORD_MAP_VERSION {
            return Err(Error::Decryption(format!(
                "unsupported password map version: {}",
                map.version
            )));
        }
        Ok(map.passwords)
    }

    /// The latest published session. Operations call this once at entry
    /// and complete against the snapshot they captured.
    fn current_session(&self) -> Result<Session> {
        self.session.borrow().clone().ok_or(Error::IdentityNotSet)
    }
}
