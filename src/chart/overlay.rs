//! Safety-order ladder and take-profit levels drawn over the candles.

use tracing::warn;

use crate::errors::{AppError, Result};
use crate::models::{OverlayKind, OverlayLine, PriceBucket, StrategyParameters};

/// Upper bound on the ladder length a strategy may request.
pub const MAX_SAFETY_ORDERS: u32 = 100;

/// Close of the latest bucket, the price the overlay is anchored to.
pub fn reference_price(buckets: &[PriceBucket]) -> Option<f64> {
    buckets.last().map(|b| b.close)
}

/// Price levels for a DCA bot entered at `reference_price`.
///
/// Safety orders come first in ordinal order, each one `price_deviation`
/// below the previous, with the step widened by `safety_order_gap_multiplier`
/// every time. Then the take-profit level, then the reference price itself.
pub fn compute_overlay_lines(
    reference_price: f64,
    params: &StrategyParameters,
) -> Result<Vec<OverlayLine>> {
    if !reference_price.is_finite() || reference_price <= 0.0 {
        return Err(AppError::InvalidReferencePrice(reference_price));
    }
    validate(params)?;

    let mut lines = Vec::with_capacity(params.safety_order_count as usize + 2);

    let mut price = reference_price;
    let mut gap = 1.0;
    for ordinal in 0..params.safety_order_count {
        let next = price - price * params.price_deviation * gap;
        if !next.is_finite() || next <= 0.0 {
            warn!(
                placed = ordinal,
                requested = params.safety_order_count,
                "[CHART] safety-order ladder reaches zero; truncated"
            );
            break;
        }
        price = next;
        gap *= params.safety_order_gap_multiplier;
        lines.push(OverlayLine {
            kind: OverlayKind::SafetyOrder,
            price,
            ordinal: Some(ordinal),
        });
    }

    lines.push(OverlayLine {
        kind: OverlayKind::TakeProfit,
        price: reference_price + reference_price * params.take_profit,
        ordinal: None,
    });
    lines.push(OverlayLine {
        kind: OverlayKind::CurrentPrice,
        price: reference_price,
        ordinal: None,
    });
    Ok(lines)
}

pub(crate) fn validate(params: &StrategyParameters) -> Result<()> {
    if params.safety_order_count > MAX_SAFETY_ORDERS {
        return Err(AppError::InvalidStrategy(format!(
            "safety_order_count {} exceeds {MAX_SAFETY_ORDERS}",
            params.safety_order_count
        )));
    }
    let fractions = [
        ("price_deviation", params.price_deviation),
        ("safety_order_gap_multiplier", params.safety_order_gap_multiplier),
        ("take_profit", params.take_profit),
    ];
    for (name, value) in fractions {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::InvalidStrategy(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }
    }
    Ok(())
}
