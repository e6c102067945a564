//! GraphQL request/response shapes for Uniswap swap history.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::errors::{AppError, Result};
use crate::models::SwapEvent;

const V3_SWAPS_QUERY: &str = r"query Swaps($pool: String!, $since: BigInt!, $before: BigInt!, $first: Int!) {
  swaps(
    first: $first
    orderBy: timestamp
    orderDirection: desc
    where: { pool: $pool, timestamp_gte: $since, timestamp_lte: $before }
  ) {
    id
    timestamp
    amount0
    amount1
    amountUSD
  }
}";

const V2_SWAPS_QUERY: &str = r"query Swaps($pool: String!, $since: BigInt!, $before: BigInt!, $first: Int!) {
  swaps(
    first: $first
    orderBy: timestamp
    orderDirection: desc
    where: { pair: $pool, timestamp_gte: $since, timestamp_lte: $before }
  ) {
    id
    timestamp
    amount0In
    amount0Out
    amount1In
    amount1Out
    amountUSD
  }
}";

/// Which Uniswap subgraph schema the endpoint serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubgraphFlavor {
    V2,
    #[default]
    V3,
}

impl SubgraphFlavor {
    pub fn swaps_query(self) -> &'static str {
        match self {
            Self::V2 => V2_SWAPS_QUERY,
            Self::V3 => V3_SWAPS_QUERY,
        }
    }
}

impl FromStr for SubgraphFlavor {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            other => Err(AppError::Config(format!("unknown subgraph flavor '{other}'"))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: SwapsVariables,
}

#[derive(Debug, Serialize)]
pub struct SwapsVariables {
    pub pool: String,
    /// BigInt travels as a decimal string.
    pub since: String,
    pub before: String,
    pub first: u32,
}

impl GraphQlRequest {
    /// Newest-first page of swaps with `since <= timestamp <= before`.
    pub fn swaps(flavor: SubgraphFlavor, pool: Address, since: i64, before: i64, first: u32) -> Self {
        Self {
            query: flavor.swaps_query(),
            variables: SwapsVariables {
                pool: format!("{pool:#x}"),
                since: since.to_string(),
                before: before.to_string(),
                first,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SwapsData {
    pub swaps: Vec<RawSwap>,
}

/// Swap as served by either subgraph flavor. Numbers arrive as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSwap {
    pub id: Option<String>,
    pub timestamp: String,
    pub amount0: Option<String>,
    pub amount1: Option<String>,
    pub amount0_in: Option<String>,
    pub amount0_out: Option<String>,
    pub amount1_in: Option<String>,
    pub amount1_out: Option<String>,
    #[serde(rename = "amountUSD")]
    pub amount_usd: Option<String>,
}

fn num(field: &Option<String>) -> Option<f64> {
    field.as_deref()?.trim().parse().ok()
}

fn net(signed: &Option<String>, inflow: &Option<String>, outflow: &Option<String>) -> Option<f64> {
    match signed {
        Some(_) => num(signed),
        None => Some(num(inflow)? - num(outflow)?),
    }
}

impl RawSwap {
    /// Normalize to signed net amounts; `None` if any required number is
    /// missing or malformed.
    pub fn to_event(&self) -> Option<SwapEvent> {
        Some(SwapEvent {
            id: self.id.clone(),
            timestamp: self.timestamp.trim().parse().ok()?,
            amount0: net(&self.amount0, &self.amount0_in, &self.amount0_out)?,
            amount1: net(&self.amount1, &self.amount1_in, &self.amount1_out)?,
            amount_usd: num(&self.amount_usd),
        })
    }
}

/// One decoded page. `fetched` counts records served, including dropped ones.
#[derive(Debug, Clone, Default)]
pub struct SwapPage {
    pub events: Vec<SwapEvent>,
    pub fetched: usize,
}

pub fn decode_response(resp: GraphQlResponse<SwapsData>) -> Result<SwapPage> {
    if !resp.errors.is_empty() {
        let messages: Vec<String> = resp.errors.into_iter().map(|e| e.message).collect();
        return Err(AppError::Subgraph(messages.join("; ")));
    }
    let data = resp
        .data
        .ok_or_else(|| AppError::Subgraph("response carried no data".into()))?;

    let fetched = data.swaps.len();
    let events = data
        .swaps
        .iter()
        .filter_map(|raw| {
            let event = raw.to_event();
            if event.is_none() {
                warn!(id = ?raw.id, timestamp = %raw.timestamp, "[SUBGRAPH] malformed swap dropped");
            }
            event
        })
        .collect();
    Ok(SwapPage { events, fetched })
}

pub fn decode_swaps(body: &str) -> Result<SwapPage> {
    let resp: GraphQlResponse<SwapsData> = serde_json::from_str(body)?;
    decode_response(resp)
}
