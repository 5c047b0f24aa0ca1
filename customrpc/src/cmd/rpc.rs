//! Registry subcommands — `add`, `update`, `activate`, `remove`, `list`, `show`.
//!
//! Each command opens the configured snapshot store, applies one registry
//! operation through a [`SharedRegistry`] (which persists the result) and
//! returns the line(s) to print.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::chain::{ChainId, RpcEndpoint};
use crate::config::{Config, EnvLookup, load_config_with_env};
use crate::error::{Error, RegistryError};
use crate::registry::{AddOutcome, RemoveEffect, SharedRegistry};
use crate::store::{JsonFileStore, RegistryStore};

/// Resolve the configuration for `config_path`.
///
/// A missing configuration file is not an error: defaults are used, resolved
/// relative to the directory the file would live in.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read or parsed.
pub fn settings(config_path: &Path, env: EnvLookup<'_>) -> Result<Config, Error> {
    if config_path.exists() {
        load_config_with_env(config_path, env)
    } else {
        let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Config::defaults_with_env(base_dir, env))
    }
}

/// Open the store-backed registry described by `config`.
///
/// Seed endpoints from the configuration are registered only when no
/// snapshot exists yet.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or saved, or a seed
/// endpoint is rejected.
pub fn open(config: &Config) -> Result<SharedRegistry, Error> {
    let store = JsonFileStore::new(config.store());
    let fresh = !store.exists();
    let mut registry = store.load()?;

    if fresh && !config.rpcs().is_empty() {
        for seed in config.rpcs() {
            registry.add_custom_rpc(seed.clone()).map_err(|e| {
                Error::config_with(format!("invalid seed endpoint '{}'", seed.rpc_url), e)
            })?;
        }
        store.save(&registry)?;
        info!(count = config.rpcs().len(), "registered seed custom RPCs");
    }

    Ok(SharedRegistry::with_store(registry, Arc::new(store)))
}

/// `customrpc add`.
///
/// # Errors
///
/// Returns an error if the endpoint is rejected or cannot be persisted.
pub async fn add(registry: &SharedRegistry, endpoint: RpcEndpoint) -> Result<String, Error> {
    let chain_id = endpoint.chain_id;
    let rpc_url = endpoint.rpc_url.clone();
    let message = match registry.add_custom_rpc(endpoint).await? {
        AddOutcome::Created => format!("Added {rpc_url} to chain {chain_id} (active)"),
        AddOutcome::Appended => format!("Added {rpc_url} to chain {chain_id}"),
        AddOutcome::Updated => format!("Updated {rpc_url} on chain {chain_id}"),
    };
    Ok(message)
}

/// `customrpc update`.
///
/// # Errors
///
/// Returns an error if no such endpoint exists or it cannot be persisted.
pub async fn update(registry: &SharedRegistry, endpoint: RpcEndpoint) -> Result<String, Error> {
    let chain_id = endpoint.chain_id;
    let rpc_url = endpoint.rpc_url.clone();
    registry.update_custom_rpc(endpoint).await?;
    Ok(format!("Updated {rpc_url} on chain {chain_id}"))
}

/// `customrpc activate`.
///
/// # Errors
///
/// Returns an error if the chain or endpoint is unknown or the change cannot
/// be persisted.
pub async fn activate(
    registry: &SharedRegistry,
    chain_id: ChainId,
    rpc_url: &str,
) -> Result<String, Error> {
    registry.set_active_rpc(chain_id, rpc_url).await?;
    Ok(format!("Chain {chain_id} now uses {rpc_url}"))
}

/// `customrpc remove`.
///
/// # Errors
///
/// Returns an error if no chain holds the URL or the change cannot be
/// persisted.
pub async fn remove(registry: &SharedRegistry, rpc_url: &str) -> Result<String, Error> {
    let removal = registry.remove_custom_rpc(rpc_url).await?;
    let chain_id = removal.chain_id;
    let message = match removal.effect {
        RemoveEffect::Removed => format!("Removed {rpc_url} from chain {chain_id}"),
        RemoveEffect::Promoted(next) => {
            format!("Removed {rpc_url} from chain {chain_id}, active RPC is now {next}")
        }
        RemoveEffect::ChainRemoved => {
            format!("Removed {rpc_url}, chain {chain_id} has no custom RPC left")
        }
    };
    Ok(message)
}

/// `customrpc list`.
pub async fn list(registry: &SharedRegistry) -> String {
    let snapshot = registry.snapshot().await;
    if snapshot.is_empty() {
        return "No custom RPCs registered".to_owned();
    }
    let mut out = String::new();
    for (chain_id, group) in snapshot.chains() {
        let name = group
            .active()
            .map(|e| e.display_name.as_str())
            .filter(|name| !name.is_empty())
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{chain_id}\t{} endpoint(s)\tactive {}{name}",
            group.len(),
            group.active_rpc_url()
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// `customrpc show`.
///
/// # Errors
///
/// Returns [`RegistryError::ChainNotFound`] if the chain has no group.
pub async fn show(registry: &SharedRegistry, chain_id: ChainId) -> Result<String, Error> {
    let group = registry
        .chain_group(chain_id)
        .await
        .ok_or(RegistryError::ChainNotFound(chain_id))?;
    serde_json::to_string_pretty(&group)
        .map_err(|e| Error::store_with("failed to serialise chain group", e))
}
