//! Numeric chain identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// EIP-155 style numeric chain identifier.
///
/// Serialised as a bare integer. As a JSON map key it becomes the decimal
/// string, which `serde_json` parses back transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const MAINNET: Self = Self(1);
    /// OP Mainnet.
    pub const OPTIMISM: Self = Self(10);
    /// BNB Smart Chain.
    pub const BSC: Self = Self(56);
    /// Polygon PoS.
    pub const POLYGON: Self = Self(137);
    /// Base.
    pub const BASE: Self = Self(8453);
    /// Arbitrum One.
    pub const ARBITRUM: Self = Self(42161);
    /// Zora.
    pub const ZORA: Self = Self(7_777_777);

    /// Wraps a raw chain id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a chain id string is not a decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chain id '{0}'")]
pub struct ParseChainIdError(String);

impl FromStr for ChainId {
    type Err = ParseChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseChainIdError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: ChainId = "8453".parse().unwrap();
        assert_eq!(id, ChainId::BASE);
        assert_eq!(id.to_string(), "8453");
        assert!("eip155:1".parse::<ChainId>().is_err());
        assert!("".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_serializes_as_integer_value_and_string_key() {
        assert_eq!(serde_json::to_string(&ChainId::OPTIMISM).unwrap(), "10");

        let mut map = BTreeMap::new();
        map.insert(ChainId::MAINNET, "a");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":"a"}"#);

        let back: BTreeMap<ChainId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&ChainId::MAINNET).map(String::as_str), Some("a"));
    }
}
