//! # facet-vault - Selective-Disclosure Encrypted Vault
//!
//! Client-side identity and personal-data vault. Each user is identified
//! by a public key derived deterministically from a secret phrase;
//! personal fields are stored encrypted in a remote repository that never
//! sees plaintext. Owners can disclose a chosen subset of fields to a
//! specific recipient by sealing the per-field passwords for that
//! recipient's key - and nothing else.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use facet_vault::{ClearVault, IdentityManager, VaultManager};
//! use facet_vault::testkit::{MemoryAccountAuthority, MemoryVaultStore};
//!
//! #[tokio::main]
//! async fn main() -> facet_vault::Result<()> {
//!     let store = Arc::new(MemoryVaultStore::new());
//!     let authority = Arc::new(MemoryAccountAuthority::new());
//!
//!     let identities = IdentityManager::new(authority);
//!     let vaults = VaultManager::new(store, identities.subscribe());
//!
//!     identities.register("owner secret", "session proof").await?;
//!
//!     let mut vault = ClearVault::new();
//!     vault.insert("email", "o@x.com");
//!     vaults.update_own_vault(&vault).await?;
//!
//!     let readback = vaults.own_vault().await?;
//!     assert_eq!(readback.get("email"), Some("o@x.com"));
//!     Ok(())
//! }
//! ```

mod error;
mod identity;
mod manager;
mod types;

pub mod ports;
pub mod testkit;

pub use error::{Error, Result};
pub use identity::{IdentityManager, Session};
pub use manager::VaultManager;
pub use ports::{AccountAuthority, VaultStore};
pub use types::{
    CipherVault, ClearVault, DisclosureEnvelope, Identity, PasswordMap, PublicKey,
    PASSWORD_MAP_VERSION,
};
