//! Account lifecycle and identity-change notification tests.

use facet_crypto::Keyring;
use facet_vault::testkit::MemoryAccountAuthority;
use facet_vault::{Error, IdentityManager};
use std::sync::Arc;

fn manager() -> IdentityManager {
    IdentityManager::new(Arc::new(MemoryAccountAuthority::new()))
}

#[tokio::test]
async fn register_publishes_signed_identity() {
    let identities = manager();

    let identity = identities
        .register("owner secret", "session proof")
        .await
        .unwrap();

    assert_eq!(identity.message, "session proof");
    Keyring::verify(
        identity.public_key.as_bytes(),
        b"session proof",
        &identity.signature,
    )
    .unwrap();

    assert_eq!(identities.current_identity(), Some(identity));
}

#[tokio::test]
async fn register_is_deterministic_per_phrase() {
    let a = manager();
    let b = manager();

    let id_a = a.register("same phrase", "").await.unwrap();
    let id_b = b.register("same phrase", "").await.unwrap();
    assert_eq!(id_a.public_key, id_b.public_key);

    let id_c = b.register("other phrase", "").await.unwrap();
    assert_ne!(id_a.public_key, id_c.public_key);
}

#[tokio::test]
async fn duplicate_registration_rejected() {
    let identities = manager();

    identities.register("owner secret", "").await.unwrap();
    let err = identities.register("owner secret", "").await.unwrap_err();
    assert!(matches!(err, Error::Registration(_)));
}

#[tokio::test]
async fn empty_phrase_fails_derivation() {
    let identities = manager();
    let err = identities.register("", "").await.unwrap_err();
    assert!(matches!(err, Error::Derivation(_)));
}

#[tokio::test]
async fn check_account_requires_registration() {
    let identities = manager();

    let err = identities
        .check_account("never registered", "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(identities.current_identity().is_none());
}

#[tokio::test]
async fn check_account_publishes_existing_identity() {
    let identities = manager();

    let registered = identities.register("owner secret", "").await.unwrap();
    let checked = identities
        .check_account("owner secret", "back again")
        .await
        .unwrap();

    assert_eq!(registered.public_key, checked.public_key);
    assert_eq!(checked.message, "back again");
    assert_eq!(identities.current_identity(), Some(checked));
}

#[tokio::test]
async fn unsubscribe_unknown_account_fails_not_found() {
    let identities = manager();

    let err = identities.unsubscribe("never registered").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn unsubscribe_removes_account_without_publishing() {
    let identities = manager();

    let registered = identities.register("owner secret", "").await.unwrap();
    identities.unsubscribe("owner secret").await.unwrap();

    // The session stays published; only the remote account is gone.
    assert_eq!(identities.current_identity(), Some(registered));
    let err = identities.check_account("owner secret", "").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn subscribers_observe_identity_changes() {
    let identities = manager();
    let mut rx = identities.subscribe();

    assert!(rx.borrow().is_none());

    let first = identities.register("first phrase", "").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(
        rx.borrow_and_update().as_ref().unwrap().identity.public_key,
        first.public_key
    );

    // A later registration replaces the whole session; no merging.
    let second = identities.register("second phrase", "").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(
        rx.borrow_and_update().as_ref().unwrap().identity.public_key,
        second.public_key
    );
}

#[tokio::test]
async fn new_mnemonic_is_fresh_and_derivable() {
    let identities = manager();

    let a = identities.new_mnemonic();
    let b = identities.new_mnemonic();
    assert_ne!(a, b);

    // No side effects: nothing registered, nothing published.
    assert!(identities.current_identity().is_none());
    let err = identities.check_account(&a, "").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
