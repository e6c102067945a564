//! Uniswap subgraph integration: where the swap history comes from.

pub mod client;
pub mod query;

pub use client::SubgraphClient;
pub use query::{RawSwap, SubgraphFlavor, SwapPage, decode_swaps};

use ethers::types::Address;

use crate::errors::{AppError, Result};

/// Parse a pool (v3) or pair (v2) contract address.
pub fn parse_pool_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid pool address '{raw}': {e}")))
}
