//! In-memory implementations of the boundary traits, used by the
//! integration tests and handy for demos. Not suitable for production:
//! nothing is persisted and there is no transport.

use crate::error::{Error, Result};
use crate::ports::{AccountAuthority, VaultStore};
use crate::types::{CipherVault, Identity, PublicKey};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory [`VaultStore`]: one ciphertext mapping per public key, each
/// update replacing the whole mapping (last write wins, like the remote
/// repository it stands in for).
#[derive(Default)]
pub struct MemoryVaultStore {
    data: RwLock<HashMap<PublicKey, CipherVault>>,
}

impl MemoryVaultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultStore for MemoryVaultStore {
    async fn get_data(&self, owner: &PublicKey) -> Result<CipherVault> {
        Ok(self
            .data
            .read()
            .await
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_data(&self, owner: &PublicKey, data: CipherVault) -> Result<CipherVault> {
        self.data.write().await.insert(*owner, data.clone());
        Ok(data)
    }
}

/// In-memory [`AccountAuthority`] tracking registered public keys.
#[derive(Default)]
pub struct MemoryAccountAuthority {
    accounts: RwLock<HashSet<PublicKey>>,
}

impl MemoryAccountAuthority {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountAuthority for MemoryAccountAuthority {
    async fn register(&self, claim: &Identity) -> Result<Identity> {
        let mut accounts = self.accounts.write().await;
        if !accounts.insert(claim.public_key) {
            return Err(Error::Registration(format!(
                "public key already registered: {}",
                claim.public_key
            )));
        }
        Ok(claim.clone())
    }

    async fn check_account(&self, claim: &Identity) -> Result<Identity> {
        if self.accounts.read().await.contains(&claim.public_key) {
            Ok(claim.clone())
        } else {
            Err(Error::NotFound(claim.public_key.to_string()))
        }
    }

    async fn unsubscribe(&self, claim: &Identity) -> Result<Identity> {
        if self.accounts.write().await.remove(&claim.public_key) {
            Ok(claim.clone())
        } else {
            Err(Error::NotFound(claim.public_key.to_string()))
        }
    }
}
