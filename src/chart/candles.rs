//! OHLC bucketing of raw swaps.

use serde::Serialize;
use tracing::warn;

use super::interval::Interval;
use super::price::{SkipReason, implied_price};
use crate::models::{PriceBucket, PriceMode, SwapEvent};

/// A swap that did not make it into any bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSwap {
    pub timestamp: i64,
    pub id: Option<String>,
    pub reason: SkipReason,
}

/// Bucketed candles plus the swaps that were left out of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleSeries {
    pub buckets: Vec<PriceBucket>,
    pub skipped: Vec<SkippedSwap>,
}

impl CandleSeries {
    fn skip(&mut self, event: &SwapEvent, reason: SkipReason) {
        warn!(
            timestamp = event.timestamp,
            id = ?event.id,
            %reason,
            "[CHART] swap skipped"
        );
        self.skipped.push(SkippedSwap {
            timestamp: event.timestamp,
            id: event.id.clone(),
            reason,
        });
    }
}

/// Daily candles, the granularity the bot charts use.
pub fn aggregate_to_daily_buckets(events: &[SwapEvent], mode: PriceMode) -> CandleSeries {
    aggregate_buckets(events, mode, Interval::Day)
}

/// Fold swaps into OHLC buckets of `interval` width, ascending by start.
///
/// Input order is not trusted: swaps are stably sorted by timestamp first,
/// so swaps sharing a timestamp keep their relative input order.
pub fn aggregate_buckets(events: &[SwapEvent], mode: PriceMode, interval: Interval) -> CandleSeries {
    let mut ordered: Vec<&SwapEvent> = events.iter().collect();
    ordered.sort_by_key(|ev| ev.timestamp);

    let mut series = CandleSeries::default();
    for event in ordered {
        let price = match implied_price(event, mode) {
            Ok(price) => price,
            Err(reason) => {
                series.skip(event, reason);
                continue;
            }
        };
        let Some(start) = interval.truncate(event.timestamp) else {
            series.skip(event, SkipReason::InvalidTimestamp);
            continue;
        };

        match series.buckets.last_mut() {
            Some(last) if last.bucket_start == start => last.update(price),
            _ => series.buckets.push(PriceBucket::opening(start, price)),
        }
    }

    if !series.skipped.is_empty() {
        warn!(
            skipped = series.skipped.len(),
            total = events.len(),
            %mode,
            "[CHART] swaps without a usable price left out of candles"
        );
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    // 2024-01-01T00:00:00Z
    const DAY1: i64 = 1_704_067_200;

    #[test]
    fn empty_input_gives_empty_series() {
        let series = aggregate_to_daily_buckets(&[], PriceMode::BaseQuote);
        assert!(series.buckets.is_empty());
        assert!(series.skipped.is_empty());
    }

    #[test]
    fn same_day_swaps_share_a_bucket() {
        let events = vec![
            SwapEvent::new(DAY1 + 60, -1.0, 200.0),
            SwapEvent::new(DAY1 + 120, 1.0, -210.0),
            SwapEvent::new(DAY1 + 3 * DAY + 5, -1.0, 220.0),
        ];
        let series = aggregate_to_daily_buckets(&events, PriceMode::BaseQuote);
        assert_eq!(series.buckets.len(), 2);

        let day1 = series.buckets[0];
        assert_eq!(day1.bucket_start, DAY1);
        assert_eq!((day1.open, day1.high, day1.low, day1.close), (200.0, 210.0, 200.0, 210.0));
        assert_eq!(day1.trades, 2);

        let day4 = series.buckets[1];
        assert_eq!(day4.bucket_start, DAY1 + 3 * DAY);
        assert_eq!((day4.open, day4.high, day4.low, day4.close), (220.0, 220.0, 220.0, 220.0));
    }

    #[test]
    fn out_of_order_input_is_sorted() {
        let events = vec![
            SwapEvent::new(DAY1 + 500, 1.0, 30.0),
            SwapEvent::new(DAY1 + 100, 1.0, 10.0),
            SwapEvent::new(DAY1 + 300, 1.0, 5.0),
        ];
        let b = aggregate_to_daily_buckets(&events, PriceMode::BaseQuote).buckets[0];
        assert_eq!((b.open, b.high, b.low, b.close), (10.0, 30.0, 5.0, 30.0));
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let events = vec![
            SwapEvent::new(DAY1, 1.0, 7.0),
            SwapEvent::new(DAY1, 1.0, 8.0),
            SwapEvent::new(DAY1, 1.0, 6.0),
        ];
        let b = aggregate_to_daily_buckets(&events, PriceMode::BaseQuote).buckets[0];
        assert_eq!(b.open, 7.0);
        assert_eq!(b.close, 6.0);
    }

    #[test]
    fn unusable_swaps_are_reported_and_do_not_touch_ohlc() {
        let mut zero = SwapEvent::new(DAY1 + 10, 0.0, 100.0);
        zero.id = Some("0xabc#1".into());
        let events = vec![
            SwapEvent::new(DAY1, 1.0, 50.0),
            zero,
            SwapEvent::new(DAY1 + 20, 1.0, 0.0),
            SwapEvent::new(DAY1 + 30, 1.0, 55.0),
        ];
        let series = aggregate_to_daily_buckets(&events, PriceMode::BaseQuote);
        let b = series.buckets[0];
        assert_eq!((b.open, b.high, b.low, b.close), (50.0, 55.0, 50.0, 55.0));
        assert_eq!(b.trades, 2);

        assert_eq!(series.skipped.len(), 2);
        assert_eq!(series.skipped[0].reason, SkipReason::ZeroBaseAmount);
        assert_eq!(series.skipped[0].id.as_deref(), Some("0xabc#1"));
        assert_eq!(series.skipped[1].reason, SkipReason::InvalidPrice);
    }

    #[test]
    fn usd_mode_prices_from_usd_amount() {
        let events = vec![
            SwapEvent::new(DAY1, -2.0, 4000.0).with_usd(4010.0),
            SwapEvent::new(DAY1 + 1, 1.0, -2100.0),
        ];
        let series = aggregate_to_daily_buckets(&events, PriceMode::Usd);
        assert_eq!(series.buckets[0].close, 2005.0);
        assert_eq!(series.skipped[0].reason, SkipReason::MissingUsdAmount);
    }

    #[test]
    fn every_bucket_brackets_open_and_close() {
        let events: Vec<SwapEvent> = (0..200)
            .map(|i| {
                let wobble = ((i * 37) % 23) as f64;
                SwapEvent::new(DAY1 + i * 5_000, -1.0, 100.0 + wobble)
            })
            .collect();
        let series = aggregate_buckets(&events, PriceMode::BaseQuote, Interval::FourHours);
        assert!(!series.buckets.is_empty());
        for b in &series.buckets {
            assert!(b.low <= b.open && b.open <= b.high);
            assert!(b.low <= b.close && b.close <= b.high);
        }
        for w in series.buckets.windows(2) {
            assert!(w[0].bucket_start < w[1].bucket_start);
        }
    }
}
