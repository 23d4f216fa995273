use crate::error::{Error, Result};
use crate::ports::AccountAuthority;
use crate::types::{Identity, PublicKey};
use facet_crypto::Keyring;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// An authenticated identity coupled with the key material that produced
/// it. Published as a unit so observers can both address and decrypt.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    keyring: Arc<Keyring>,
}

impl Session {
    pub fn public_key(&self) -> PublicKey {
        self.identity.public_key
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }
}

/// Resolves secret phrases to signed identities and keeps exactly one
/// "current" session, broadcast over a watch channel.
///
/// Every successful `register`/`check_account` atomically replaces the
/// current session and notifies subscribers; the previous session is
/// discarded, not merged. `unsubscribe` does not publish.
pub struct IdentityManager {
    authority: Arc<dyn AccountAuthority>,
    current: watch::Sender<Option<Session>>,
}

impl IdentityManager {
    pub fn new(authority: Arc<dyn AccountAuthority>) -> Self {
        let (current, _) = watch::channel(None);
        Self { authority, current }
    }

    /// Subscribe to identity-change notifications. The receiver always
    /// observes the latest published session.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// The currently published identity, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().as_ref().map(|s| s.identity.clone())
    }

    /// Derive an identity from `secret_phrase`, register it with the
    /// account authority, sign `message` as proof of possession, and
    /// publish the result as the current session.
    pub async fn register(&self, secret_phrase: &str, message: &str) -> Result<Identity> {
        let keyring = derive_keyring(secret_phrase)?;
        let claim = Identity::claim(PublicKey::from_bytes(keyring.public_key()));
        self.authority.register(&claim).await?;
        Ok(self.publish(keyring, message))
    }

    /// Like [`register`](Self::register), but requires the account to
    /// already exist at the authority.
    pub async fn check_account(&self, secret_phrase: &str, message: &str) -> Result<Identity> {
        let keyring = derive_keyring(secret_phrase)?;
        let claim = Identity::claim(PublicKey::from_bytes(keyring.public_key()));
        self.authority.check_account(&claim).await?;
        Ok(self.publish(keyring, message))
    }

    /// Request deletion of the account and all associated data. Leaves the
    /// current session untouched.
    pub async fn unsubscribe(&self, secret_phrase: &str) -> Result<Identity> {
        let keyring = derive_keyring(secret_phrase)?;
        let claim = Identity::claim(PublicKey::from_bytes(keyring.public_key()));
        self.authority.unsubscribe(&claim).await
    }

    /// A fresh, high-entropy secret phrase. No side effects.
    pub fn new_mnemonic(&self) -> String {
        Keyring::generate_phrase()
    }

    fn publish(&self, keyring: Keyring, message: &str) -> Identity {
        let identity = Identity {
            public_key: PublicKey::from_bytes(keyring.public_key()),
            message: message.to_string(),
            signature: keyring.sign(message.as_bytes()),
        };
        let session = Session {
            identity: identity.clone(),
            keyring: Arc::new(keyring),
        };
        self.current.send_replace(Some(session));
        info!(identity = %identity.public_key, "published current identity");
        identity
    }
}

fn derive_keyring(secret_phrase: &str) -> Result<Keyring> {
    Keyring::from_phrase(secret_phrase).map_err(|e| Error::Derivation(e.to_string()))
}
