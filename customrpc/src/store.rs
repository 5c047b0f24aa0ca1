//! Versioned registry snapshots and their JSON file store.
//!
//! The registry core never performs I/O. A [`RegistryStore`] reads and writes
//! the whole chain map as a [`Snapshot`]: a JSON document tagged with
//! `version` so older layouts can be migrated on load.
//!
//! ```json
//! {
//!   "version": 1,
//!   "chains": {
//!     "1": {
//!       "endpoints": [{ "chain_id": 1, "rpc_url": "https://eth.llamarpc.com", ... }],
//!       "active_rpc_url": "https://eth.llamarpc.com"
//!     }
//!   }
//! }
//! ```
//!
//! # Versions
//!
//! - `0` — legacy layout; `version` may be absent and a group may omit
//!   `active_rpc_url`. Migration selects the first endpoint and drops groups
//!   without endpoints.
//! - `1` — current layout; every group must be complete.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::{ChainId, RpcEndpoint};
use crate::error::{Error, RegistryError};
use crate::registry::{ChainGroup, CustomRpcRegistry};

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialised form of a [`ChainGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChainGroup {
    /// Endpoints in insertion order.
    pub endpoints: Vec<RpcEndpoint>,
    /// Active endpoint URL; only optional in legacy snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_rpc_url: Option<String>,
}

/// Serialised registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Layout version, see the module docs.
    #[serde(default)]
    pub version: u32,
    /// Chain groups keyed by chain id.
    #[serde(default)]
    pub chains: BTreeMap<ChainId, StoredChainGroup>,
}

impl Snapshot {
    /// Captures the current state of a registry.
    #[must_use]
    pub fn from_registry(registry: &CustomRpcRegistry) -> Self {
        let chains = registry
            .chains()
            .iter()
            .map(|(chain_id, group)| {
                let stored = StoredChainGroup {
                    endpoints: group.endpoints().to_vec(),
                    active_rpc_url: Some(group.active_rpc_url().to_owned()),
                };
                (*chain_id, stored)
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            chains,
        }
    }

    /// Upgrades the snapshot to [`SNAPSHOT_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSnapshot`] for versions newer than
    /// this build understands.
    pub fn migrate(mut self) -> Result<Self, RegistryError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(RegistryError::InvalidSnapshot(format!(
                "unsupported snapshot version {} (newest known is {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        if self.version == 0 {
            self.chains.retain(|_, group| !group.endpoints.is_empty());
            for group in self.chains.values_mut() {
                if group.active_rpc_url.is_none() {
                    group.active_rpc_url = group.endpoints.first().map(|e| e.rpc_url.clone());
                }
            }
            info!(from = 0, to = 1, "migrated custom RPC snapshot");
            self.version = 1;
        }
        Ok(self)
    }

    /// Migrates and validates the snapshot, then builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSnapshot`] if the migrated data breaks
    /// any registry invariant.
    pub fn into_registry(self) -> Result<CustomRpcRegistry, RegistryError> {
        let snapshot = self.migrate()?;
        let mut chains = BTreeMap::new();
        for (chain_id, stored) in snapshot.chains {
            let active = stored.active_rpc_url.ok_or_else(|| {
                RegistryError::InvalidSnapshot(format!("chain {chain_id} has no active rpc_url"))
            })?;
            let group = ChainGroup::try_from_parts(chain_id, stored.endpoints, active)?;
            chains.insert(chain_id, group);
        }
        CustomRpcRegistry::from_chains(chains)
    }
}

impl From<CustomRpcRegistry> for Snapshot {
    fn from(registry: CustomRpcRegistry) -> Self {
        let chains = registry
            .into_chains()
            .into_iter()
            .map(|(chain_id, group)| {
                let (endpoints, active) = group.into_parts();
                let stored = StoredChainGroup {
                    endpoints,
                    active_rpc_url: Some(active),
                };
                (chain_id, stored)
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            chains,
        }
    }
}

/// Durable home of a registry.
pub trait RegistryStore: fmt::Debug + Send + Sync {
    /// Restores the registry, or an empty one if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if stored data cannot be read or is invalid.
    fn load(&self) -> Result<CustomRpcRegistry, Error>;

    /// Replaces the stored registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the snapshot cannot be written.
    fn save(&self, registry: &CustomRpcRegistry) -> Result<(), Error>;
}

/// [`RegistryStore`] backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the given file path. Nothing is touched until the
    /// first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a snapshot has been written.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<CustomRpcRegistry, Error> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no custom RPC snapshot, starting empty");
                return Ok(CustomRpcRegistry::new());
            }
            Err(e) => {
                return Err(Error::store_with(
                    format!("failed to read '{}'", self.path.display()),
                    e,
                ));
            }
        };
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            Error::store_with(format!("failed to parse '{}'", self.path.display()), e)
        })?;
        let registry = snapshot.into_registry().map_err(|e| {
            Error::store_with(format!("rejected snapshot '{}'", self.path.display()), e)
        })?;
        debug!(path = %self.path.display(), chains = registry.len(), "custom RPC snapshot loaded");
        Ok(registry)
    }

    fn save(&self, registry: &CustomRpcRegistry) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::store_with(format!("failed to create '{}'", parent.display()), e)
            })?;
        }
        let content = serde_json::to_string_pretty(&Snapshot::from_registry(registry))
            .map_err(|e| Error::store_with("failed to serialise snapshot", e))?;

        let tmp = self.tmp_path();
        fs::write(&tmp, content)
            .map_err(|e| Error::store_with(format!("failed to write '{}'", tmp.display()), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            Error::store_with(format!("failed to replace '{}'", self.path.display()), e)
        })?;
        debug!(path = %self.path.display(), chains = registry.len(), "custom RPC snapshot saved");
        Ok(())
    }
}
