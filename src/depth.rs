// Depth normalization: raw price levels -> cumulative depth + percentage-of-max
//
// Everything in here is pure and deterministic. Levels arrive in the
// side's natural order (bids best-first descending, asks best-first
// ascending) and keep that order.

use crate::error::SimulatorError;
use crate::types::{OrderbookLevel, OrderbookSnapshot, PriceLevel};

/// Running cumulative size along one side, in the order given.
/// `percentage_of_max` is left at zero until both sides are known.
fn cumulative_side(levels: &[PriceLevel]) -> Vec<OrderbookLevel> {
    let mut cumulative = 0.0;
    levels
        .iter()
        .map(|level| {
            cumulative += level.size;
            OrderbookLevel {
                price: level.price,
                size: level.size,
                cumulative_size: cumulative,
                percentage_of_max: 0.0,
            }
        })
        .collect()
}

fn max_cumulative(side: &[OrderbookLevel]) -> f64 {
    // Cumulative sizes are non-decreasing, so the last level holds the max
    side.last().map(|level| level.cumulative_size).unwrap_or(0.0)
}

/// Derive both sides' cumulative depth and scale each level against the
/// largest cumulative value across the whole book.
pub fn normalize_depth(
    bids: &[PriceLevel],
    asks: &[PriceLevel],
) -> (Vec<OrderbookLevel>, Vec<OrderbookLevel>) {
    let mut bid_levels = cumulative_side(bids);
    let mut ask_levels = cumulative_side(asks);

    let max = f64::max(max_cumulative(&bid_levels), max_cumulative(&ask_levels));
    if max > 0.0 && max.is_finite() {
        for level in bid_levels.iter_mut().chain(ask_levels.iter_mut()) {
            level.percentage_of_max = level.cumulative_size / max * 100.0;
        }
    }

    (bid_levels, ask_levels)
}

/// Build a full snapshot from raw levels, failing closed on degenerate
/// input: an empty side, a non-positive best bid, or non-finite sizes
/// would make the spread or percentage math emit NaN/Infinity, so the
/// snapshot is rejected instead.
pub fn build_snapshot(
    bids: &[PriceLevel],
    asks: &[PriceLevel],
    timestamp: i64,
) -> Result<OrderbookSnapshot, SimulatorError> {
    let degenerate = || SimulatorError::DegenerateBook {
        bids: bids.len(),
        asks: asks.len(),
    };

    if bids.is_empty() || asks.is_empty() {
        return Err(degenerate());
    }
    for level in bids.iter().chain(asks.iter()) {
        if !level.price.is_finite() || !level.size.is_finite() || level.size < 0.0 {
            return Err(degenerate());
        }
    }

    let (bid_levels, ask_levels) = normalize_depth(bids, asks);

    let max = f64::max(max_cumulative(&bid_levels), max_cumulative(&ask_levels));
    if max <= 0.0 {
        return Err(degenerate());
    }

    let best_bid = bid_levels[0].price;
    let best_ask = ask_levels[0].price;
    if best_bid <= 0.0 {
        return Err(degenerate());
    }

    let spread = best_ask - best_bid;
    let spread_percentage = spread / best_bid * 100.0;

    Ok(OrderbookSnapshot {
        bids: bid_levels,
        asks: ask_levels,
        spread,
        spread_percentage,
        timestamp,
    })
}
