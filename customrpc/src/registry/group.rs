//! Per-chain endpoint group with its active selection.

use std::collections::HashSet;

use serde::Serialize;

use crate::chain::{ChainId, RpcEndpoint};
use crate::error::RegistryError;

/// All custom endpoints registered for one chain plus the active one.
///
/// A group is never empty and `active_rpc_url` always names one of its
/// endpoints. Mutation is only possible through
/// [`CustomRpcRegistry`](super::CustomRpcRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainGroup {
    endpoints: Vec<RpcEndpoint>,
    active_rpc_url: String,
}

impl ChainGroup {
    /// Starts a group whose first endpoint is also the active one.
    pub(super) fn new(first: RpcEndpoint) -> Self {
        Self {
            active_rpc_url: first.rpc_url.clone(),
            endpoints: vec![first],
        }
    }

    /// Rebuilds a group from restored parts, checking every intra-group
    /// invariant.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSnapshot`] if the group is empty,
    /// holds an endpoint of another chain, an invalid or duplicate URL, or an
    /// active URL that is not one of its endpoints.
    pub fn try_from_parts(
        chain_id: ChainId,
        endpoints: Vec<RpcEndpoint>,
        active_rpc_url: String,
    ) -> Result<Self, RegistryError> {
        if endpoints.is_empty() {
            return Err(RegistryError::InvalidSnapshot(format!(
                "chain {chain_id} has no endpoints"
            )));
        }
        let mut seen = HashSet::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            if endpoint.chain_id != chain_id {
                return Err(RegistryError::InvalidSnapshot(format!(
                    "endpoint '{}' of chain {} stored under chain {chain_id}",
                    endpoint.rpc_url, endpoint.chain_id
                )));
            }
            endpoint
                .validate()
                .map_err(|e| RegistryError::InvalidSnapshot(e.to_string()))?;
            if !seen.insert(endpoint.rpc_url.as_str()) {
                return Err(RegistryError::InvalidSnapshot(format!(
                    "duplicate rpc_url '{}' in chain {chain_id}",
                    endpoint.rpc_url
                )));
            }
        }
        if !seen.contains(active_rpc_url.as_str()) {
            return Err(RegistryError::InvalidSnapshot(format!(
                "active rpc_url '{active_rpc_url}' is not registered for chain {chain_id}"
            )));
        }
        Ok(Self {
            endpoints,
            active_rpc_url,
        })
    }

    /// Endpoints in insertion order.
    #[must_use]
    pub fn endpoints(&self) -> &[RpcEndpoint] {
        &self.endpoints
    }

    /// URL of the active endpoint.
    #[must_use]
    pub fn active_rpc_url(&self) -> &str {
        &self.active_rpc_url
    }

    /// The active endpoint record.
    #[must_use]
    pub fn active(&self) -> Option<&RpcEndpoint> {
        self.get(&self.active_rpc_url)
    }

    /// Looks up an endpoint by URL.
    #[must_use]
    pub fn get(&self, rpc_url: &str) -> Option<&RpcEndpoint> {
        self.endpoints.iter().find(|e| e.rpc_url == rpc_url)
    }

    /// Returns `true` if an endpoint with this URL is registered.
    #[must_use]
    pub fn contains(&self, rpc_url: &str) -> bool {
        self.get(rpc_url).is_some()
    }

    /// Number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always `false` for a group reachable through the registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub(super) fn get_mut(&mut self, rpc_url: &str) -> Option<&mut RpcEndpoint> {
        self.endpoints.iter_mut().find(|e| e.rpc_url == rpc_url)
    }

    pub(super) fn push(&mut self, endpoint: RpcEndpoint) {
        self.endpoints.push(endpoint);
    }

    /// Caller must have checked that `rpc_url` is registered.
    pub(super) fn set_active(&mut self, rpc_url: &str) {
        rpc_url.clone_into(&mut self.active_rpc_url);
    }

    /// Removes the endpoint, keeping the order of the survivors.
    pub(super) fn take(&mut self, rpc_url: &str) -> Option<RpcEndpoint> {
        let index = self.endpoints.iter().position(|e| e.rpc_url == rpc_url)?;
        Some(self.endpoints.remove(index))
    }

    /// Makes the earliest remaining endpoint active. Group must be non-empty.
    pub(super) fn promote_first(&mut self) -> &str {
        self.active_rpc_url.clone_from(&self.endpoints[0].rpc_url);
        &self.active_rpc_url
    }

    /// Splits the group into its endpoints and active URL.
    #[must_use]
    pub fn into_parts(self) -> (Vec<RpcEndpoint>, String) {
        (self.endpoints, self.active_rpc_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(url: &str) -> RpcEndpoint {
        RpcEndpoint::new(ChainId::MAINNET, url)
    }

    #[test]
    fn test_try_from_parts_accepts_consistent_group() {
        let group = ChainGroup::try_from_parts(
            ChainId::MAINNET,
            vec![endpoint("http://a.rpc"), endpoint("http://b.rpc")],
            "http://b.rpc".to_owned(),
        )
        .unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.active().unwrap().rpc_url, "http://b.rpc");
    }

    #[test]
    fn test_try_from_parts_rejects_broken_groups() {
        let cases = [
            (vec![], "http://a.rpc"),
            (vec![endpoint("http://a.rpc")], "http://gone.rpc"),
            (vec![endpoint("http://a.rpc"), endpoint("http://a.rpc")], "http://a.rpc"),
            (vec![RpcEndpoint::new(ChainId::OPTIMISM, "http://a.rpc")], "http://a.rpc"),
            (vec![endpoint("")], ""),
        ];
        for (endpoints, active) in cases {
            let err =
                ChainGroup::try_from_parts(ChainId::MAINNET, endpoints, active.to_owned())
                    .unwrap_err();
            assert!(matches!(err, RegistryError::InvalidSnapshot(_)), "{err}");
        }
    }

    #[test]
    fn test_take_preserves_order_and_promote_picks_first() {
        let mut group = ChainGroup::new(endpoint("http://a.rpc"));
        group.push(endpoint("http://b.rpc"));
        group.push(endpoint("http://c.rpc"));

        let removed = group.take("http://a.rpc").unwrap();
        assert_eq!(removed.rpc_url, "http://a.rpc");
        assert_eq!(group.promote_first(), "http://b.rpc");

        let urls: Vec<_> = group.endpoints().iter().map(|e| e.rpc_url.as_str()).collect();
        assert_eq!(urls, ["http://b.rpc", "http://c.rpc"]);
        assert!(group.take("http://a.rpc").is_none());
    }
}
