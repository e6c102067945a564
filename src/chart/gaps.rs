//! Flat-line filling of idle periods between candles.

use super::interval::Interval;
use crate::models::PriceBucket;

/// Fill missing calendar days between daily buckets.
pub fn fill_gaps(buckets: &[PriceBucket]) -> Vec<PriceBucket> {
    fill_gaps_with(buckets, Interval::Day)
}

/// Insert a flat bucket for every missing `interval` step between two
/// consecutive buckets, carrying the previous close forward.
///
/// Nothing is added before the first or after the last bucket, and an
/// already-filled series comes back unchanged.
pub fn fill_gaps_with(buckets: &[PriceBucket], interval: Interval) -> Vec<PriceBucket> {
    let Some((first, rest)) = buckets.split_first() else {
        return Vec::new();
    };
    let step = interval.step_secs();

    let mut filled = Vec::with_capacity(buckets.len());
    let mut prev = *first;
    filled.push(prev);
    for next in rest {
        let mut at = prev.bucket_start;
        while let Some(slot) = at.checked_add(step).filter(|slot| *slot < next.bucket_start) {
            filled.push(PriceBucket::flat(slot, prev.close));
            at = slot;
        }
        filled.push(*next);
        prev = *next;
    }
    filled
}
