use anyhow::Result;

use super::CredentialStore;
use crate::domain::models::Credential;
use crate::domain::models::CredentialPersistence;
use crate::infrastructure::persistence::MemoryCredentials;

#[test]
fn it_starts_anonymous() {
    let store = CredentialStore::new(Box::<MemoryCredentials>::default());
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
}

#[test]
fn it_loads_persisted_credentials() -> Result<()> {
    let persistence = MemoryCredentials::with(Credential::new("access", "refresh"));
    let store = CredentialStore::load(Box::new(persistence))?;

    assert!(store.is_authenticated());
    assert_eq!(store.access_token(), Some("access".to_string()));
    assert_eq!(store.refresh_token(), Some("refresh".to_string()));

    return Ok(());
}

#[test]
fn it_replaces_both_tokens_and_persists_them() -> Result<()> {
    let persistence = MemoryCredentials::default();
    let store = CredentialStore::new(Box::new(persistence.clone()));

    store.replace(Credential::new("first", "first-refresh"));
    store.replace(Credential::new("second", "second-refresh"));

    assert_eq!(
        store.current(),
        Some(Credential::new("second", "second-refresh"))
    );
    assert_eq!(
        persistence.load()?,
        Some(Credential::new("second", "second-refresh"))
    );

    return Ok(());
}

#[test]
fn it_clears_memory_and_persistence() -> Result<()> {
    let persistence = MemoryCredentials::with(Credential::new("access", "refresh"));
    let store = CredentialStore::load(Box::new(persistence.clone()))?;

    store.clear();

    assert!(!store.is_authenticated());
    assert_eq!(persistence.load()?, None);

    return Ok(());
}
