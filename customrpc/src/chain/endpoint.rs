//! Custom RPC endpoint records.

use serde::{Deserialize, Serialize};
use url::Url;

use super::ChainId;
use crate::error::RegistryError;

/// Native currency metadata of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Human-readable name (e.g. `"Ether"`).
    pub name: String,
    /// Ticker symbol (e.g. `"ETH"`).
    pub symbol: String,
    /// Decimal places of the smallest unit (default: 18).
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

const fn default_decimals() -> u8 {
    18
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "Ether".to_owned(),
            symbol: "ETH".to_owned(),
            decimals: default_decimals(),
        }
    }
}

/// A single user-registered RPC endpoint for one chain.
///
/// `rpc_url` is the identity key inside a chain group. Everything else is
/// descriptive metadata that the registry stores and returns untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoint {
    /// Chain served by this endpoint.
    pub chain_id: ChainId,
    /// Primary HTTP(S) or WS(S) URL.
    pub rpc_url: String,
    /// Name shown to the user.
    #[serde(default)]
    pub display_name: String,
    /// Short network slug (e.g. `"mainnet"`).
    #[serde(default)]
    pub network_name: String,
    /// Native currency of the network.
    #[serde(default)]
    pub native_currency: NativeCurrency,
    /// Optional block explorer URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl RpcEndpoint {
    /// Creates an endpoint with default metadata.
    pub fn new(chain_id: ChainId, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            rpc_url: rpc_url.into(),
            display_name: String::new(),
            network_name: String::new(),
            native_currency: NativeCurrency::default(),
            explorer_url: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the network name.
    #[must_use]
    pub fn with_network_name(mut self, network: impl Into<String>) -> Self {
        self.network_name = network.into();
        self
    }

    /// Sets the native currency.
    #[must_use]
    pub fn with_native_currency(mut self, currency: NativeCurrency) -> Self {
        self.native_currency = currency;
        self
    }

    /// Sets the block explorer URL.
    #[must_use]
    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }

    /// Checks that the record can be registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidEndpoint`] if `rpc_url` is blank or is
    /// not an absolute URL.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.rpc_url.trim().is_empty() {
            return Err(RegistryError::InvalidEndpoint(format!(
                "empty rpc_url for chain {}",
                self.chain_id
            )));
        }
        Url::parse(&self.rpc_url).map_err(|e| {
            RegistryError::InvalidEndpoint(format!("'{}' is not a valid URL: {e}", self.rpc_url))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_http_and_ws() {
        assert!(RpcEndpoint::new(ChainId::MAINNET, "https://eth.llamarpc.com").validate().is_ok());
        assert!(RpcEndpoint::new(ChainId::MAINNET, "wss://eth.llamarpc.com").validate().is_ok());
        assert!(RpcEndpoint::new(ChainId::MAINNET, "http://127.0.0.1:8545").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_and_relative() {
        for url in ["", "   ", "not a url", "/rpc"] {
            let err = RpcEndpoint::new(ChainId::MAINNET, url).validate().unwrap_err();
            assert!(matches!(err, RegistryError::InvalidEndpoint(_)), "{url:?}");
        }
    }

    #[test]
    fn test_deserialize_fills_metadata_defaults() {
        let endpoint: RpcEndpoint =
            serde_json::from_str(r#"{"chain_id":10,"rpc_url":"https://mainnet.optimism.io"}"#)
                .unwrap();
        assert_eq!(endpoint.chain_id, ChainId::OPTIMISM);
        assert_eq!(endpoint.native_currency, NativeCurrency::default());
        assert_eq!(endpoint.explorer_url, None);
    }

    #[test]
    fn test_explorer_url_omitted_when_absent() {
        let json = serde_json::to_value(RpcEndpoint::new(ChainId::BASE, "https://mainnet.base.org"))
            .unwrap();
        assert!(json.get("explorer_url").is_none());
    }
}
