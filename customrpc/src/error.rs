//! Unified error types for the registry and its collaborators.

use thiserror::Error;

use crate::chain::ChainId;

/// Outcome of a rejected registry operation.
///
/// Every variant is recoverable: the registry is left exactly as it was
/// before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The endpoint record is malformed (empty or unparseable `rpc_url`).
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// No chain group is registered for the chain.
    #[error("no custom RPC registered for chain {0}")]
    ChainNotFound(ChainId),

    /// No endpoint with this URL exists in the relevant group(s).
    #[error("custom RPC '{0}' not found")]
    EndpointNotFound(String),

    /// The URL is already registered under another chain.
    #[error("RPC url '{rpc_url}' is already registered for chain {chain_id}")]
    RpcUrlInUse {
        /// The conflicting URL.
        rpc_url: String,
        /// The chain that currently owns the URL.
        chain_id: ChainId,
    },

    /// A restored snapshot violates the registry invariants.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Top-level error type for the `customrpc` application.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be resolved, read, or parsed.
    #[error("config: {0}")]
    Config(String),

    /// Snapshot store could not be read or written.
    #[error("store: {0}")]
    Store(String),

    /// A registry operation was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Error {
    /// Builds a [`Error::Config`] from a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Builds a [`Error::Config`] from a context message and a source error.
    pub fn config_with(context: impl AsRef<str>, source: impl std::fmt::Display) -> Self {
        Self::Config(format!("{}: {source}", context.as_ref()))
    }

    /// Builds a [`Error::Store`] from a message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Builds a [`Error::Store`] from a context message and a source error.
    pub fn store_with(context: impl AsRef<str>, source: impl std::fmt::Display) -> Self {
        Self::Store(format!("{}: {source}", context.as_ref()))
    }
}
