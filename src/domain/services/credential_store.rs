#[cfg(test)]
#[path = "credential_store_test.rs"]
mod tests;

use std::sync::PoisonError;
use std::sync::RwLock;

use anyhow::Result;

use crate::domain::models::Credential;
use crate::domain::models::CredentialPersistence;

/// Holds the current token pair and mirrors every change to persistence.
pub struct CredentialStore {
    current: RwLock<Option<Credential>>,
    persistence: Box<dyn CredentialPersistence>,
}

impl CredentialStore {
    pub fn new(persistence: Box<dyn CredentialPersistence>) -> CredentialStore {
        return CredentialStore {
            current: RwLock::new(None),
            persistence,
        };
    }

    /// Builds a store primed with whatever the persistence layer holds.
    pub fn load(persistence: Box<dyn CredentialPersistence>) -> Result<CredentialStore> {
        let current = persistence.load()?;
        return Ok(CredentialStore {
            current: RwLock::new(current),
            persistence,
        });
    }

    pub fn current(&self) -> Option<Credential> {
        return self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
    }

    pub fn access_token(&self) -> Option<String> {
        return self.current().map(|credential| return credential.access_token);
    }

    pub fn refresh_token(&self) -> Option<String> {
        return self.current().map(|credential| return credential.refresh_token);
    }

    pub fn is_authenticated(&self) -> bool {
        return self.current().is_some();
    }

    /// Swaps in a new pair. The in-memory pair stays authoritative even if it
    /// cannot be persisted.
    pub fn replace(&self, credential: Credential) {
        if let Err(err) = self.persistence.store(&credential) {
            tracing::warn!(error = ?err, "Failed to persist credentials");
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;

        if let Err(err) = self.persistence.clear() {
            tracing::warn!(error = ?err, "Failed to clear persisted credentials");
        }
    }
}
