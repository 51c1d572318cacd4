use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use anyhow::Result;

use crate::domain::models::Credential;
use crate::domain::models::CredentialPersistence;

/// In-memory persistence. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryCredentials {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl MemoryCredentials {
    pub fn with(credential: Credential) -> MemoryCredentials {
        return MemoryCredentials {
            slot: Arc::new(RwLock::new(Some(credential))),
        };
    }
}

impl CredentialPersistence for MemoryCredentials {
    fn load(&self) -> Result<Option<Credential>> {
        return Ok(self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone());
    }

    fn store(&self, credential: &Credential) -> Result<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        return Ok(());
    }

    fn clear(&self) -> Result<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        return Ok(());
    }
}
