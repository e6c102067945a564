//! Configuration loader and application settings.

use ethers::types::Address;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::chart::overlay;
use crate::errors::{AppError, Result};
use crate::models::StrategyParameters;
use crate::pipeline::ChartSettings;
use crate::subgraph::{SubgraphFlavor, client::DEFAULT_PAGE_SIZE, parse_pool_address};

/// Uniswap V3 ETH/USDC 0.3%
pub const DEFAULT_POOL: &str = "0x8ad599c3a0ff1de082011efddc58f1908eb6e6d8";
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Where swaps are read from.
#[derive(Debug, Clone)]
pub enum SwapSource {
    /// JSON array of swaps on disk.
    File(PathBuf),
    Subgraph {
        url: Url,
        pool: Address,
        flavor: SubgraphFlavor,
        page_size: u32,
    },
}

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SwapSource,
    /// History window fetched from the subgraph.
    pub lookback_days: u32,
    /// Refresh period; `None` runs once and exits.
    pub watch_interval_secs: Option<u64>,
    pub chart: ChartSettings,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match non_empty(&lookup, "SWAPS_FILE") {
            Some(path) => SwapSource::File(PathBuf::from(path)),
            None => {
                let url = non_empty(&lookup, "SUBGRAPH_URL").ok_or_else(|| {
                    AppError::Config("set SUBGRAPH_URL to a Uniswap subgraph endpoint, or SWAPS_FILE".into())
                })?;
                let pool = non_empty(&lookup, "POOL_ADDRESS").unwrap_or_else(|| DEFAULT_POOL.into());
                SwapSource::Subgraph {
                    url: Url::parse(&url)?,
                    pool: parse_pool_address(&pool)?,
                    flavor: parse_or(&lookup, "SUBGRAPH_FLAVOR", SubgraphFlavor::default())?,
                    page_size: parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
                }
            }
        };

        let watch_interval_secs = match non_empty(&lookup, "WATCH_INTERVAL_SECS") {
            Some(raw) => Some(parse_value::<u64>("WATCH_INTERVAL_SECS", &raw)?),
            None => None,
        };

        Ok(Self {
            source,
            lookback_days: parse_or(&lookup, "LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS)?,
            watch_interval_secs,
            chart: ChartSettings {
                mode: parse_or(&lookup, "PRICE_MODE", Default::default())?,
                interval: parse_or(&lookup, "CANDLE_INTERVAL", Default::default())?,
                strategy: load_strategy_params(&lookup)?,
            },
        })
    }
}

/// Load DCA strategy parameters, falling back to defaults for unset variables.
/// Values that parse but fail strategy validation are `Config` errors.
pub fn load_strategy_params<F>(lookup: &F) -> Result<StrategyParameters>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = StrategyParameters::default();
    let params = StrategyParameters {
        safety_order_count: parse_or(lookup, "SAFETY_ORDER_COUNT", defaults.safety_order_count)?,
        price_deviation: parse_or(lookup, "PRICE_DEVIATION", defaults.price_deviation)?,
        safety_order_gap_multiplier: parse_or(
            lookup,
            "SAFETY_ORDER_GAP_MULTIPLIER",
            defaults.safety_order_gap_multiplier,
        )?,
        take_profit: parse_or(lookup, "TAKE_PROFIT", defaults.take_profit)?,
    };
    overlay::validate(&params).map_err(|e| AppError::Config(e.to_string()))?;
    Ok(params)
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key}={raw:?} is invalid: {e}")))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match non_empty(lookup, key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}
