//! Swaps in, chart-ready snapshot out.

use serde::Serialize;
use tracing::info;

use crate::chart::{
    CandleSeries, Interval, SkippedSwap, aggregate_buckets, compute_overlay_lines, fill_gaps_with,
    reference_price,
};
use crate::errors::Result;
use crate::models::{OverlayLine, PriceBucket, PriceMode, StrategyParameters, SwapEvent};

/// Everything the rendering layer needs for one bot chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub mode: PriceMode,
    pub interval: Interval,
    pub buckets: Vec<PriceBucket>,
    pub skipped: Vec<SkippedSwap>,
    pub reference_price: Option<f64>,
    pub overlay: Vec<OverlayLine>,
}

/// How a snapshot is built from swaps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChartSettings {
    pub mode: PriceMode,
    pub interval: Interval,
    pub strategy: StrategyParameters,
}

/// Rebuild the whole chart from scratch: bucket, fill idle periods, then
/// anchor the overlay at the last close. No swaps means no overlay.
pub fn build_snapshot(events: &[SwapEvent], settings: &ChartSettings) -> Result<ChartSnapshot> {
    let CandleSeries { buckets, skipped } =
        aggregate_buckets(events, settings.mode, settings.interval);
    let real = buckets.len();
    let buckets = fill_gaps_with(&buckets, settings.interval);

    let reference_price = reference_price(&buckets);
    let overlay = match reference_price {
        Some(price) => compute_overlay_lines(price, &settings.strategy)?,
        None => Vec::new(),
    };

    info!(
        swaps = events.len(),
        candles = real,
        filled = buckets.len() - real,
        skipped = skipped.len(),
        reference_price,
        "[CHART] snapshot built"
    );

    Ok(ChartSnapshot {
        mode: settings.mode,
        interval: settings.interval,
        buckets,
        skipped,
        reference_price,
        overlay,
    })
}
