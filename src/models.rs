//! Shared data structures used throughout the application.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// A single pool swap, normalized to signed net token flows.
///
/// Only magnitudes matter for pricing, so both the signed v3 shape and the
/// v2 in/out shape (folded to `in - out` at decode time) fit here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEvent {
    #[serde(default)]
    pub id: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub amount0: f64,
    pub amount1: f64,
    #[serde(default, rename = "amountUSD")]
    pub amount_usd: Option<f64>,
}

impl SwapEvent {
    pub fn new(timestamp: i64, amount0: f64, amount1: f64) -> Self {
        Self {
            id: None,
            timestamp,
            amount0,
            amount1,
            amount_usd: None,
        }
    }

    pub fn with_usd(mut self, amount_usd: f64) -> Self {
        self.amount_usd = Some(amount_usd);
        self
    }
}

/// Denomination of the implied price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceMode {
    /// token1 per token0.
    #[default]
    BaseQuote,
    /// USD per token0.
    Usd,
}

impl FromStr for PriceMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base-quote" | "basequote" | "token" => Ok(Self::BaseQuote),
            "usd" => Ok(Self::Usd),
            other => Err(AppError::Config(format!("unknown price mode '{other}'"))),
        }
    }
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseQuote => f.write_str("base-quote"),
            Self::Usd => f.write_str("usd"),
        }
    }
}

/// One OHLC candle. `bucket_start` is in seconds, aligned to the interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBucket {
    pub bucket_start: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Swaps folded into this bucket; zero for gap-filled buckets.
    pub trades: u32,
}

impl PriceBucket {
    pub fn opening(bucket_start: i64, price: f64) -> Self {
        Self {
            bucket_start,
            open: price,
            high: price,
            low: price,
            close: price,
            trades: 1,
        }
    }

    /// Flat bucket carrying `close` forward over an idle period.
    pub fn flat(bucket_start: i64, close: f64) -> Self {
        Self {
            bucket_start,
            open: close,
            high: close,
            low: close,
            close,
            trades: 0,
        }
    }

    pub fn update(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.trades += 1;
    }

    pub fn is_synthetic(&self) -> bool {
        self.trades == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    SafetyOrder,
    TakeProfit,
    CurrentPrice,
}

/// Horizontal reference level drawn over the candles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLine {
    pub kind: OverlayKind,
    pub price: f64,
    /// Deviation step for safety orders, `None` otherwise.
    pub ordinal: Option<u32>,
}

/// DCA bot settings that shape the overlay ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub safety_order_count: u32,
    /// Fraction, e.g. 0.04 for 4%.
    pub price_deviation: f64,
    pub safety_order_gap_multiplier: f64,
    /// Fraction, e.g. 0.08 for 8%.
    pub take_profit: f64,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            safety_order_count: 3,
            price_deviation: 0.04,
            safety_order_gap_multiplier: 1.5,
            take_profit: 0.08,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_event_deserializes_camel_case() {
        let raw = r#"{"timestamp": 1700000000, "amount0": -1.5, "amount1": 300.0, "amountUSD": 301.2}"#;
        let ev: SwapEvent = serde_json::from_str(raw).expect("json should parse");
        assert_eq!(ev.timestamp, 1_700_000_000);
        assert_eq!(ev.amount_usd, Some(301.2));
        assert_eq!(ev.id, None);
    }

    #[test]
    fn price_mode_parses_aliases() {
        assert_eq!("USD".parse::<PriceMode>().unwrap(), PriceMode::Usd);
        assert_eq!("base-quote".parse::<PriceMode>().unwrap(), PriceMode::BaseQuote);
        assert!("eur".parse::<PriceMode>().is_err());
    }

    #[test]
    fn bucket_update_tracks_extremes() {
        let mut b = PriceBucket::opening(0, 10.0);
        b.update(12.0);
        b.update(9.0);
        b.update(11.0);
        assert_eq!((b.open, b.high, b.low, b.close), (10.0, 12.0, 9.0, 11.0));
        assert_eq!(b.trades, 4);
        assert!(!b.is_synthetic());
        assert!(PriceBucket::flat(0, 11.0).is_synthetic());
    }

    #[test]
    fn chart_types_serialize_camel_case() {
        let bucket = serde_json::to_value(PriceBucket::flat(86_400, 2.5)).unwrap();
        assert_eq!(bucket["bucketStart"], 86_400);
        assert_eq!(bucket["trades"], 0);

        let line = OverlayLine {
            kind: OverlayKind::SafetyOrder,
            price: 96.0,
            ordinal: Some(1),
        };
        let json = serde_json::to_value(line).unwrap();
        assert_eq!(json["kind"], "SafetyOrder");
        assert_eq!(json["ordinal"], 1);
    }
}
