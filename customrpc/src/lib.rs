//! Custom RPC endpoint registry.
//!
//! Users register one or more custom RPC endpoints per chain and select
//! exactly one of them as active. The crate provides:
//!
//! - [`registry`] — [`CustomRpcRegistry`], the in-memory core, and
//!   [`SharedRegistry`] for concurrent hosts.
//! - [`store`] — versioned JSON snapshots for persistence.
//! - [`config`] — TOML configuration.
//! - [`cmd`] — the `customrpc` command line.
//!
//! ```
//! use customrpc::{ChainId, CustomRpcRegistry, RpcEndpoint};
//!
//! let mut registry = CustomRpcRegistry::new();
//! registry.add_custom_rpc(RpcEndpoint::new(ChainId::MAINNET, "https://eth.llamarpc.com"))?;
//! assert_eq!(
//!     registry.active_rpc(ChainId::MAINNET).map(|e| e.rpc_url.as_str()),
//!     Some("https://eth.llamarpc.com")
//! );
//! # Ok::<(), customrpc::RegistryError>(())
//! ```

pub mod chain;
pub mod cmd;
pub mod config;
pub mod error;
pub mod registry;
pub mod store;
pub mod telemetry;

pub use chain::{ChainId, NativeCurrency, RpcEndpoint};
pub use error::{Error, RegistryError};
pub use registry::{AddOutcome, ChainGroup, CustomRpcRegistry, RemoveEffect, Removal, SharedRegistry};
