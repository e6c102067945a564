//! Candle construction and trading overlays for the bot charts.
//!
//! Everything in here is pure: swaps in, buckets and price levels out.

pub mod candles;
pub mod gaps;
pub mod interval;
pub mod overlay;
pub mod price;

pub use candles::{CandleSeries, SkippedSwap, aggregate_buckets, aggregate_to_daily_buckets};
pub use gaps::{fill_gaps, fill_gaps_with};
pub use interval::Interval;
pub use overlay::{compute_overlay_lines, reference_price};
pub use price::{SkipReason, implied_price, round_significant};
