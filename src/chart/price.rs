//! Implied swap prices.

use serde::Serialize;
use std::fmt;

use crate::models::{PriceMode, SwapEvent};

/// Prices are normalized to this many significant digits before they take
/// part in OHLC comparisons.
pub const SIGNIFICANT_DIGITS: usize = 5;

/// Why a swap contributed no price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ZeroBaseAmount,
    MissingUsdAmount,
    NonFiniteAmount,
    InvalidPrice,
    InvalidTimestamp,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::ZeroBaseAmount => "token0 amount is zero",
            Self::MissingUsdAmount => "no USD amount",
            Self::NonFiniteAmount => "amount is not finite",
            Self::InvalidPrice => "price is not a finite positive number",
            Self::InvalidTimestamp => "timestamp out of range",
        };
        f.write_str(msg)
    }
}

/// Round to [`SIGNIFICANT_DIGITS`] significant digits, the same way
/// scientific-notation formatting with four fractional digits would.
pub fn round_significant(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(f64::NAN)
}

/// Price of token0 implied by a swap, in token1 or USD depending on `mode`.
pub fn implied_price(event: &SwapEvent, mode: PriceMode) -> Result<f64, SkipReason> {
    if !event.amount0.is_finite() {
        return Err(SkipReason::NonFiniteAmount);
    }
    let base = event.amount0.abs();
    if base == 0.0 {
        return Err(SkipReason::ZeroBaseAmount);
    }
    // only the amounts the mode reads are checked
    let quote = match mode {
        PriceMode::BaseQuote if event.amount1.is_finite() => event.amount1.abs(),
        PriceMode::BaseQuote => return Err(SkipReason::NonFiniteAmount),
        PriceMode::Usd => match event.amount_usd {
            Some(usd) if usd.is_finite() => usd.abs(),
            Some(_) => return Err(SkipReason::NonFiniteAmount),
            None => return Err(SkipReason::MissingUsdAmount),
        },
    };

    let price = round_significant(quote / base);
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(SkipReason::InvalidPrice)
    }
}
