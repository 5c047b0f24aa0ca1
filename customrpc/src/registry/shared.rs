//! Lock-guarded registry handle for concurrent hosts.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{AddOutcome, ChainGroup, CustomRpcRegistry, Removal};
use crate::chain::{ChainId, RpcEndpoint};
use crate::error::{Error, RegistryError};
use crate::store::RegistryStore;

/// Cloneable handle to a [`CustomRpcRegistry`] behind a single
/// [`RwLock`].
///
/// Each mutation holds the write lock for its whole read-modify-write, so
/// readers never observe a half-applied operation. With a store attached the
/// snapshot is saved on the blocking pool before the lock is released, and a
/// failed save rolls the mutation back.
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<CustomRpcRegistry>>,
    store: Option<Arc<dyn RegistryStore>>,
}

impl SharedRegistry {
    /// Wraps a registry without persistence.
    #[must_use]
    pub fn new(registry: CustomRpcRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
            store: None,
        }
    }

    /// Wraps a registry and saves it to `store` after every successful
    /// mutation. A mutation whose save fails is undone.
    #[must_use]
    pub fn with_store(registry: CustomRpcRegistry, store: Arc<dyn RegistryStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
            store: Some(store),
        }
    }

    /// See [`CustomRpcRegistry::add_custom_rpc`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] if the operation is rejected or
    /// [`Error::Store`] if the snapshot could not be saved.
    pub async fn add_custom_rpc(&self, endpoint: RpcEndpoint) -> Result<AddOutcome, Error> {
        self.mutate(|registry| registry.add_custom_rpc(endpoint))
            .await
    }

    /// See [`CustomRpcRegistry::update_custom_rpc`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] if the operation is rejected or
    /// [`Error::Store`] if the snapshot could not be saved.
    pub async fn update_custom_rpc(&self, endpoint: RpcEndpoint) -> Result<(), Error> {
        self.mutate(|registry| registry.update_custom_rpc(endpoint))
            .await
    }

    /// See [`CustomRpcRegistry::set_active_rpc`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] if the operation is rejected or
    /// [`Error::Store`] if the snapshot could not be saved.
    pub async fn set_active_rpc(&self, chain_id: ChainId, rpc_url: &str) -> Result<(), Error> {
        self.mutate(|registry| registry.set_active_rpc(chain_id, rpc_url))
            .await
    }

    /// See [`CustomRpcRegistry::remove_custom_rpc`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] if the operation is rejected or
    /// [`Error::Store`] if the snapshot could not be saved.
    pub async fn remove_custom_rpc(&self, rpc_url: &str) -> Result<Removal, Error> {
        self.mutate(|registry| registry.remove_custom_rpc(rpc_url))
            .await
    }

    /// Cloned group of a chain.
    pub async fn chain_group(&self, chain_id: ChainId) -> Option<ChainGroup> {
        self.inner.read().await.chain_group(chain_id).cloned()
    }

    /// Cloned active endpoint of a chain.
    pub async fn active_rpc(&self, chain_id: ChainId) -> Option<RpcEndpoint> {
        self.inner.read().await.active_rpc(chain_id).cloned()
    }

    /// Chains with at least one custom endpoint.
    pub async fn list_chains(&self) -> BTreeSet<ChainId> {
        self.inner.read().await.list_chains()
    }

    /// Consistent copy of the whole registry.
    pub async fn snapshot(&self) -> CustomRpcRegistry {
        self.inner.read().await.clone()
    }

    async fn mutate<T, F>(&self, op: F) -> Result<T, Error>
    where
        F: FnOnce(&mut CustomRpcRegistry) -> Result<T, RegistryError>,
    {
        let mut registry = self.inner.write().await;
        let Some(store) = &self.store else {
            return Ok(op(&mut *registry)?);
        };

        let previous = registry.clone();
        let value = op(&mut *registry)?;

        let store = Arc::clone(store);
        let snapshot = registry.clone();
        let saved = match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(result) => result,
            Err(e) => Err(Error::store_with("snapshot save task failed", e)),
        };
        if let Err(e) = saved {
            tracing::error!(error = %e, "failed to persist custom RPC registry, change rolled back");
            *registry = previous;
            return Err(e);
        }
        Ok(value)
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(CustomRpcRegistry::new())
    }
}
