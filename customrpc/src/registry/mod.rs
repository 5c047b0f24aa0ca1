//! Custom RPC registry.
//!
//! [`CustomRpcRegistry`] maps each [`ChainId`] to a [`ChainGroup`] of
//! user-registered endpoints and keeps exactly one of them active:
//!
//! - a group exists only while it holds at least one endpoint;
//! - URLs are unique inside a group and across the whole registry;
//! - the first endpoint added for a chain becomes active;
//! - removing the active endpoint promotes the earliest survivor, removing
//!   the last one deletes the group.
//!
//! [`SharedRegistry`] wraps the registry for concurrent hosts.

mod group;
mod shared;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

pub use self::group::ChainGroup;
pub use self::shared::SharedRegistry;
use crate::chain::{ChainId, RpcEndpoint};
use crate::error::RegistryError;

/// What [`CustomRpcRegistry::add_custom_rpc`] did with the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new chain group was created and the endpoint made active.
    Created,
    /// The endpoint was appended to an existing group.
    Appended,
    /// An endpoint with the same URL existed and its record was replaced.
    Updated,
}

/// Side effect of a removal on the chain group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveEffect {
    /// The removed endpoint was not active; the group is otherwise unchanged.
    Removed,
    /// The removed endpoint was active; the contained URL is the new active one.
    Promoted(String),
    /// The removed endpoint was the last one; the group was deleted.
    ChainRemoved,
}

/// Result of [`CustomRpcRegistry::remove_custom_rpc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Chain the endpoint was registered under.
    pub chain_id: ChainId,
    /// The removed record.
    pub endpoint: RpcEndpoint,
    /// What happened to the group.
    pub effect: RemoveEffect,
}

/// In-memory registry of custom RPC endpoints grouped by chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomRpcRegistry {
    chains: BTreeMap<ChainId, ChainGroup>,
}

impl CustomRpcRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a restored chain map verbatim after checking the cross-group
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSnapshot`] if a group is stored under
    /// the wrong chain or a URL appears in more than one group.
    pub fn from_chains(chains: BTreeMap<ChainId, ChainGroup>) -> Result<Self, RegistryError> {
        let mut owners: BTreeMap<&str, ChainId> = BTreeMap::new();
        for (chain_id, group) in &chains {
            for endpoint in group.endpoints() {
                if endpoint.chain_id != *chain_id {
                    return Err(RegistryError::InvalidSnapshot(format!(
                        "endpoint '{}' of chain {} stored under chain {chain_id}",
                        endpoint.rpc_url, endpoint.chain_id
                    )));
                }
                if let Some(owner) = owners.insert(&endpoint.rpc_url, *chain_id) {
                    return Err(RegistryError::InvalidSnapshot(format!(
                        "rpc_url '{}' registered for both chain {owner} and chain {chain_id}",
                        endpoint.rpc_url
                    )));
                }
            }
        }
        Ok(Self { chains })
    }

    /// Registers an endpoint for its chain.
    ///
    /// The first endpoint of a chain becomes active. Re-adding a URL already
    /// present in the chain replaces its metadata in place; otherwise the
    /// endpoint is appended. The active selection of an existing group is
    /// never changed.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidEndpoint`] if the URL is blank or malformed.
    /// - [`RegistryError::RpcUrlInUse`] if the URL belongs to another chain.
    pub fn add_custom_rpc(&mut self, endpoint: RpcEndpoint) -> Result<AddOutcome, RegistryError> {
        endpoint.validate().inspect_err(|e| debug!(error = %e, "custom RPC rejected"))?;

        let chain_id = endpoint.chain_id;
        if let Some(owner) = self.chain_for_rpc(&endpoint.rpc_url)
            && owner != chain_id
        {
            debug!(%chain_id, %owner, rpc_url = %endpoint.rpc_url, "custom RPC url already in use");
            return Err(RegistryError::RpcUrlInUse {
                rpc_url: endpoint.rpc_url,
                chain_id: owner,
            });
        }

        let outcome = match self.chains.entry(chain_id) {
            Entry::Vacant(slot) => {
                info!(%chain_id, rpc_url = %endpoint.rpc_url, "custom RPC chain created");
                slot.insert(ChainGroup::new(endpoint));
                AddOutcome::Created
            }
            Entry::Occupied(mut slot) => {
                let group = slot.get_mut();
                if let Some(existing) = group.get_mut(&endpoint.rpc_url) {
                    debug!(%chain_id, rpc_url = %endpoint.rpc_url, "custom RPC re-added");
                    *existing = endpoint;
                    AddOutcome::Updated
                } else {
                    debug!(%chain_id, rpc_url = %endpoint.rpc_url, "custom RPC appended");
                    group.push(endpoint);
                    AddOutcome::Appended
                }
            }
        };
        Ok(outcome)
    }

    /// Replaces the record of an existing endpoint, matched by chain and URL.
    ///
    /// The position in the group and the active selection are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EndpointNotFound`] if the chain has no group
    /// or the group has no endpoint with this URL.
    pub fn update_custom_rpc(&mut self, endpoint: RpcEndpoint) -> Result<(), RegistryError> {
        let Some(existing) = self
            .chains
            .get_mut(&endpoint.chain_id)
            .and_then(|group| group.get_mut(&endpoint.rpc_url))
        else {
            debug!(chain_id = %endpoint.chain_id, rpc_url = %endpoint.rpc_url, "custom RPC update target missing");
            return Err(RegistryError::EndpointNotFound(endpoint.rpc_url));
        };
        debug!(chain_id = %endpoint.chain_id, rpc_url = %endpoint.rpc_url, "custom RPC updated");
        *existing = endpoint;
        Ok(())
    }

    /// Selects the active endpoint of a chain.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ChainNotFound`] if the chain has no group.
    /// - [`RegistryError::EndpointNotFound`] if the group lacks the URL.
    pub fn set_active_rpc(&mut self, chain_id: ChainId, rpc_url: &str) -> Result<(), RegistryError> {
        let group = self
            .chains
            .get_mut(&chain_id)
            .ok_or(RegistryError::ChainNotFound(chain_id))?;
        if !group.contains(rpc_url) {
            return Err(RegistryError::EndpointNotFound(rpc_url.to_owned()));
        }
        group.set_active(rpc_url);
        info!(%chain_id, rpc_url, "custom RPC activated");
        Ok(())
    }

    /// Removes the endpoint with this URL from whichever chain holds it.
    ///
    /// If it was active, the earliest remaining endpoint of the chain is
    /// promoted. If it was the last one, the chain group is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EndpointNotFound`] if no chain holds the URL.
    pub fn remove_custom_rpc(&mut self, rpc_url: &str) -> Result<Removal, RegistryError> {
        let not_found = || RegistryError::EndpointNotFound(rpc_url.to_owned());
        let chain_id = self.chain_for_rpc(rpc_url).ok_or_else(not_found)?;
        let Entry::Occupied(mut slot) = self.chains.entry(chain_id) else {
            return Err(not_found());
        };

        let group = slot.get_mut();
        let endpoint = group.take(rpc_url).ok_or_else(not_found)?;
        let effect = if group.is_empty() {
            slot.remove();
            info!(%chain_id, rpc_url, "last custom RPC removed, chain dropped");
            RemoveEffect::ChainRemoved
        } else if group.active_rpc_url() == rpc_url {
            let next = group.promote_first().to_owned();
            info!(%chain_id, rpc_url, active = %next, "active custom RPC removed, promoted next");
            RemoveEffect::Promoted(next)
        } else {
            debug!(%chain_id, rpc_url, "custom RPC removed");
            RemoveEffect::Removed
        };

        Ok(Removal {
            chain_id,
            endpoint,
            effect,
        })
    }

    /// Returns the group registered for a chain.
    #[must_use]
    pub fn chain_group(&self, chain_id: ChainId) -> Option<&ChainGroup> {
        self.chains.get(&chain_id)
    }

    /// Returns the active endpoint of a chain.
    #[must_use]
    pub fn active_rpc(&self, chain_id: ChainId) -> Option<&RpcEndpoint> {
        self.chains.get(&chain_id).and_then(ChainGroup::active)
    }

    /// Chains that currently have at least one custom endpoint.
    #[must_use]
    pub fn list_chains(&self) -> BTreeSet<ChainId> {
        self.chains.keys().copied().collect()
    }

    /// Finds the chain that owns a URL.
    #[must_use]
    pub fn chain_for_rpc(&self, rpc_url: &str) -> Option<ChainId> {
        self.chains
            .iter()
            .find(|(_, group)| group.contains(rpc_url))
            .map(|(chain_id, _)| *chain_id)
    }

    /// Read-only view of every chain group, ordered by chain id.
    #[must_use]
    pub const fn chains(&self) -> &BTreeMap<ChainId, ChainGroup> {
        &self.chains
    }

    /// Consumes the registry, returning its chain map.
    #[must_use]
    pub fn into_chains(self) -> BTreeMap<ChainId, ChainGroup> {
        self.chains
    }

    /// Number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no chain has a custom endpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
