use ridepay_types::{Address, SignedDelegation};

use crate::{LocalStorage, StoreError};

/// Prefix of every key holding a stored delegation.
pub const DELEGATION_KEY_PREFIX: &str = "delegation-";

/// Storage key of the delegation granted to `delegate`.
pub fn delegation_key(delegate: &Address) -> String {
    format!("{DELEGATION_KEY_PREFIX}{delegate}")
}

/// Persistence of signed delegations, one per delegate.
pub trait DelegationStore {
    /// Store a delegation under its delegate's key, replacing any previous one.
    fn store_delegation(&self, delegation: &SignedDelegation) -> Result<(), StoreError>;
    fn get_delegation(&self, delegate: &Address) -> Result<Option<SignedDelegation>, StoreError>;
    /// Every readable delegation. Unparseable entries are skipped.
    fn get_delegations(&self) -> Result<Vec<SignedDelegation>, StoreError>;
    fn remove_delegation(&self, delegate: &Address) -> Result<(), StoreError>;
}

/// [`DelegationStore`] over any [`LocalStorage`] backend, storing JSON with
/// amounts as decimal strings.
pub struct StorageClient<S> {
    storage: S,
}

impl<S: LocalStorage> StorageClient<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: LocalStorage> DelegationStore for StorageClient<S> {
    fn store_delegation(&self, delegation: &SignedDelegation) -> Result<(), StoreError> {
        let key = delegation_key(&delegation.delegate());
        let json = serde_json::to_string(delegation)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.storage.set_item(&key, &json)?;
        tracing::debug!(%key, "stored delegation");
        Ok(())
    }

    fn get_delegation(&self, delegate: &Address) -> Result<Option<SignedDelegation>, StoreError> {
        let key = delegation_key(delegate);
        let Some(json) = self.storage.get_item(&key)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StoreError::Corruption(format!("{key}: {e}")))
    }

    fn get_delegations(&self) -> Result<Vec<SignedDelegation>, StoreError> {
        let mut keys: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(DELEGATION_KEY_PREFIX))
            .collect();
        keys.sort();

        let mut delegations = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(json) = self.storage.get_item(&key)? else {
                continue;
            };
            match serde_json::from_str::<SignedDelegation>(&json) {
                Ok(delegation) => delegations.push(delegation),
                Err(e) => tracing::warn!(%key, error = %e, "skipping unreadable delegation"),
            }
        }
        Ok(delegations)
    }

    fn remove_delegation(&self, delegate: &Address) -> Result<(), StoreError> {
        self.storage.remove_item(&delegation_key(delegate))
    }
}
