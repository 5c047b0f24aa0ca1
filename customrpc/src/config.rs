//! Configuration loading and default template generation.
//!
//! This module provides:
//!
//! - [`Config`] — snapshot location, log level and seed endpoints.
//! - [`load_config`] — Reads and parses a TOML configuration file.
//! - [`load_config_with_env`] — Same, with an explicit environment source.
//! - [`generate_default_config`] — Produces a commented TOML template.
//!
//! # Configuration File Format
//!
//! ```toml
//! store = "customrpc.json"
//! log_level = "info"
//!
//! [[rpcs]]
//! chain_id = 1
//! rpc_url = "https://eth.llamarpc.com"
//! display_name = "LlamaRPC"
//! ```
//!
//! `STORE` and `LOG_LEVEL` environment variables take precedence over the
//! file, which takes precedence over built-in defaults.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chain::RpcEndpoint;
use crate::error::Error;

const DEFAULT_STORE: &str = "customrpc.json";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Source of environment overrides, keyed by variable name.
pub type EnvLookup<'a> = &'a (dyn Fn(&str) -> Option<String> + Sync);

/// Reads a variable from the process environment.
#[must_use]
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Raw TOML layout; unset values are resolved by [`Config::resolve`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    store: Option<PathBuf>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    rpcs: Vec<RpcEndpoint>,
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    store: PathBuf,
    log_level: String,
    rpcs: Vec<RpcEndpoint>,
}

impl Config {
    /// Path of the JSON snapshot file.
    #[must_use]
    pub fn store(&self) -> &Path {
        &self.store
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Endpoints registered when no snapshot exists yet.
    #[must_use]
    pub fn rpcs(&self) -> &[RpcEndpoint] {
        &self.rpcs
    }

    /// Configuration used when no file is present, relative to `base_dir`.
    #[must_use]
    pub fn defaults(base_dir: &Path) -> Self {
        Self::defaults_with_env(base_dir, &process_env)
    }

    /// [`Config::defaults`] with an explicit environment source.
    #[must_use]
    pub fn defaults_with_env(base_dir: &Path, env: EnvLookup<'_>) -> Self {
        Self::resolve(RawConfig::default(), base_dir, env)
    }

    /// Applies `STORE` / `LOG_LEVEL` over the file values, then built-in
    /// defaults. A relative store path is taken relative to `base_dir`.
    fn resolve(raw: RawConfig, base_dir: &Path, env: EnvLookup<'_>) -> Self {
        let env_var = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let store = env_var("STORE")
            .map(PathBuf::from)
            .or(raw.store)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        let store = if store.is_relative() {
            base_dir.join(store)
        } else {
            store
        };
        let log_level = env_var("LOG_LEVEL")
            .or(raw.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());
        Self {
            store,
            log_level,
            rpcs: raw.rpcs,
        }
    }
}

/// Load configuration from a TOML file at the given path.
///
/// The `STORE` and `LOG_LEVEL` environment variables override the file;
/// values set in neither fall back to hardcoded defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be resolved, read, or parsed.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    load_config_with_env(path, &process_env)
}

/// [`load_config`] with an explicit environment source.
///
/// # Errors
///
/// Returns an error if the file cannot be resolved, read, or parsed.
pub fn load_config_with_env(path: &Path, env: EnvLookup<'_>) -> Result<Config, Error> {
    let config_path = path.canonicalize().map_err(|e| {
        Error::config_with(format!("failed to resolve config path '{}'", path.display()), e)
    })?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config_with(
            format!("failed to read config file '{}'", config_path.display()),
            e,
        )
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| {
        Error::config_with(
            format!("failed to parse TOML config '{}'", config_path.display()),
            e,
        )
    })?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(Config::resolve(raw, base_dir, env))
}

/// Generate a default TOML configuration template.
#[must_use]
pub fn generate_default_config() -> String {
    String::from(
        r#"# Custom RPC registry configuration

# Snapshot file holding the registered endpoints, relative to this file.
# Overridden by the STORE environment variable.
store = "customrpc.json"

# Log filter used when RUST_LOG is not set.
# Overridden by the LOG_LEVEL environment variable.
log_level = "info"

# ── Seed endpoints ──────────────────────────────────────────────────
# Registered once, when the snapshot file does not exist yet.
# The first endpoint of each chain becomes its active RPC.

# [[rpcs]]
# chain_id = 1
# rpc_url = "https://eth.llamarpc.com"
# display_name = "LlamaRPC"
# network_name = "mainnet"
# native_currency = { name = "Ether", symbol = "ETH", decimals = 18 }
# explorer_url = "https://etherscan.io"
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainId, NativeCurrency};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn overrides(key: &str) -> Option<String> {
        match key {
            "STORE" => Some("override/rpcs.json".to_owned()),
            "LOG_LEVEL" => Some("warn".to_owned()),
            _ => None,
        }
    }

    fn blank(_: &str) -> Option<String> {
        Some("  ".to_owned())
    }

    #[test]
    fn test_default_template_parses() {
        let raw: RawConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(raw.store.as_deref(), Some(Path::new("customrpc.json")));
        assert_eq!(raw.log_level.as_deref(), Some("info"));
        assert!(raw.rpcs.is_empty());
    }

    #[test]
    fn test_load_config_with_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customrpc.toml");
        std::fs::write(
            &path,
            r#"
store = "data/rpcs.json"
log_level = "debug"

[[rpcs]]
chain_id = 10
rpc_url = "https://mainnet.optimism.io"
display_name = "Optimism"
native_currency = { name = "Ether", symbol = "ETH", decimals = 18 }
"#,
        )
        .unwrap();

        let config = load_config_with_env(&path, &no_env).unwrap();
        let base = dir.path().canonicalize().unwrap();
        assert_eq!(config.store(), base.join("data/rpcs.json"));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.rpcs().len(), 1);
        assert_eq!(config.rpcs()[0].chain_id, ChainId::OPTIMISM);
        assert_eq!(config.rpcs()[0].native_currency, NativeCurrency::default());
    }

    #[test]
    fn test_absolute_store_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("elsewhere.json");
        let raw = RawConfig {
            store: Some(store.clone()),
            log_level: Some("warn".to_owned()),
            rpcs: Vec::new(),
        };
        let config = Config::resolve(raw, Path::new("/ignored"), &no_env);
        assert_eq!(config.store(), store);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customrpc.toml");
        std::fs::write(&path, "store = \"file.json\"\nlog_level = \"debug\"\n").unwrap();

        let config = load_config_with_env(&path, &overrides).unwrap();
        let base = dir.path().canonicalize().unwrap();
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.store(), base.join("override/rpcs.json"));

        let config = load_config_with_env(&path, &no_env).unwrap();
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.store(), base.join("file.json"));
    }

    #[test]
    fn test_blank_environment_is_ignored() {
        let config = Config::defaults_with_env(Path::new("/data"), &blank);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.store(), Path::new("/data/customrpc.json"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customrpc.toml");
        std::fs::write(&path, "port = 8080\n").unwrap();
        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
