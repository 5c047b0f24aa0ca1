//! Chain identifiers and custom RPC endpoint records.
//!
//! - [`id`] — [`ChainId`] numeric chain identifier.
//! - [`endpoint`] — [`RpcEndpoint`] and [`NativeCurrency`] descriptive records.

mod endpoint;
mod id;

pub use self::endpoint::*;
pub use self::id::*;
