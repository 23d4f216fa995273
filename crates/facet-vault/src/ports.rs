//! Boundary traits for the external collaborators the core consumes.
//!
//! The vault repository and the account registry live behind these traits;
//! the core never speaks a wire protocol itself. All data crossing the
//! [`VaultStore`] boundary is already encrypted - the store never sees
//! plaintext.

use crate::error::Result;
use crate::types::{CipherVault, Identity, PublicKey};
use async_trait::async_trait;

/// Remote key-value repository addressed by public key.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Fetch the ciphertext field mapping for `owner`. Absent owners yield
    /// an empty mapping, not an error.
    async fn get_data(&self, owner: &PublicKey) -> Result<CipherVault>;

    /// Replace the whole ciphertext mapping for `owner` and echo back what
    /// was stored. Last write wins; there is no compare-and-swap.
    async fn update_data(&self, owner: &PublicKey, data: CipherVault) -> Result<CipherVault>;
}

/// Remote account registry tracking which public keys exist.
///
/// Implementations fail with `Error::Registration` when a registration is
/// rejected, `Error::NotFound` when an account does not exist, and
/// `Error::Authority` for repository failures.
#[async_trait]
pub trait AccountAuthority: Send + Sync {
    /// Register a new account for the claimed public key.
    async fn register(&self, claim: &Identity) -> Result<Identity>;

    /// Check that an account exists for the claimed public key.
    async fn check_account(&self, claim: &Identity) -> Result<Identity>;

    /// Delete the account and all data associated with the claimed public key.
    async fn unsubscribe(&self, claim: &Identity) -> Result<Identity>;
}
